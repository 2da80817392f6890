use yew::prelude::*;

use super::app::{EditorContext, EditorSync};
use super::holdable_button::HoldableButton;
use crate::dialog::open_single_file_picker;
use crate::model::Frame;

// The frame comes in as a prop so every commit re-renders the bar; the
// context itself never changes after mount.
#[derive(Properties, PartialEq, Debug)]
pub struct ButtonBarProps {
    pub frame: Frame,
}

#[derive(Debug, PartialEq)]
struct StepControls {
    back_disabled: bool,
    label: String,
}

impl StepControls {
    fn at(frame: Frame) -> Self {
        Self {
            back_disabled: frame == 0,
            label: format!("frame {frame}"),
        }
    }
}

const BAR_STYLE: &str =
    "position:absolute; width:100%; display:flex; justify-content:center; gap:4px;";

/// Frame stepping and track loading, centered over the canvas.
#[function_component(ButtonBar)]
pub fn button_bar(props: &ButtonBarProps) -> Html {
    let Some(ctx) = use_context::<EditorContext>() else {
        return html! {};
    };
    let controls = StepControls::at(props.frame);

    // Targets are computed from the frame at dispatch time, not render time.
    let step_back = {
        let ctx = ctx.clone();
        Callback::from(move |_: ()| {
            let sync = ctx.sync.clone();
            let target = sync.frame().saturating_sub(1);
            ctx.spawn("step back", async move { sync.set_frame(target).await });
        })
    };
    let step_forward = {
        let ctx = ctx.clone();
        Callback::from(move |_: ()| {
            let sync = ctx.sync.clone();
            let target = sync.frame() + 1;
            ctx.spawn("step forward", async move { sync.set_frame(target).await });
        })
    };
    let load_track = {
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| {
            let sync = ctx.sync.clone();
            ctx.spawn("load track", pick_and_load(sync));
        })
    };

    html! {
        <div id="button-bar" style={BAR_STYLE}>
            <HoldableButton disabled={controls.back_disabled} on_step={step_back}>
                {"<"}
            </HoldableButton>
            <span class="frame-label">{ controls.label }</span>
            <HoldableButton on_step={step_forward}>{">"}</HoldableButton>
            <button onclick={load_track}>{"Load Track"}</button>
        </div>
    }
}

async fn pick_and_load(sync: EditorSync) -> Result<(), String> {
    let Some(path) = open_single_file_picker().await.map_err(|e| e.to_string())? else {
        log::debug!("track picker dismissed");
        return Ok(());
    };
    sync.load_track(&path).await.map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::FakeEngine;
    use crate::state::StateSync;
    use futures::executor::block_on;

    #[test]
    fn back_is_disabled_only_at_frame_zero() {
        assert!(StepControls::at(0).back_disabled);
        assert!(!StepControls::at(1).back_disabled);
        assert_eq!(StepControls::at(12).label, "frame 12");
    }

    #[test]
    fn props_change_with_every_frame_commit() {
        let sync = StateSync::new(FakeEngine::new());
        let initial = ButtonBarProps {
            frame: sync.frame(),
        };
        block_on(sync.set_frame(3)).unwrap();
        let stepped = ButtonBarProps {
            frame: sync.frame(),
        };
        assert_ne!(initial, stepped);
        assert_eq!(
            StepControls::at(stepped.frame),
            StepControls {
                back_disabled: false,
                label: "frame 3".to_string(),
            }
        );

        block_on(sync.set_frame(0)).unwrap();
        let rewound = ButtonBarProps {
            frame: sync.frame(),
        };
        assert_eq!(rewound, initial);
        assert!(StepControls::at(rewound.frame).back_disabled);
    }
}
