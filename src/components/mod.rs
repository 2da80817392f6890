pub mod app;
pub mod button_bar;
pub mod game_area;
pub mod holdable_button;
