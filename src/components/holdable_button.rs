use yew::prelude::*;

use super::app::EditorContext;
use crate::input::{HoldBinding, PRIMARY_BUTTON, PointerPress};
use crate::timing::BrowserTimers;

#[derive(Properties, PartialEq)]
pub struct HoldableButtonProps {
    #[prop_or_default]
    pub disabled: bool,
    /// Fired on click, then repeatedly while the button is held.
    pub on_step: Callback<()>,
    #[prop_or_default]
    pub children: Children,
}

/// Button that keeps stepping while held down.
#[function_component(HoldableButton)]
pub fn holdable_button(props: &HoldableButtonProps) -> Html {
    let config = use_context::<EditorContext>()
        .map(|ctx| ctx.config)
        .unwrap_or_default();
    // Always-current handles read by the repeat timer
    let disabled = use_mut_ref(|| props.disabled);
    *disabled.borrow_mut() = props.disabled;
    let on_step = use_mut_ref(|| props.on_step.clone());
    *on_step.borrow_mut() = props.on_step.clone();

    let binding = {
        let disabled = disabled.clone();
        let on_step = on_step.clone();
        use_memo((), move |_| {
            HoldBinding::new(
                BrowserTimers,
                &config,
                move || *disabled.borrow(),
                move || on_step.borrow().emit(()),
            )
        })
    };

    {
        let binding = binding.clone();
        use_effect_with((), move |_| {
            move || {
                if binding.is_repeating() {
                    log::debug!("held button unmounted, stopping repeat");
                }
                binding.release();
            }
        });
    }

    let onmousedown = {
        let binding = binding.clone();
        Callback::from(move |e: MouseEvent| binding.press(PointerPress { button: e.button() }))
    };
    let release = {
        let binding = binding.clone();
        Callback::from(move |_: MouseEvent| binding.release())
    };
    let onclick = {
        let on_step = props.on_step.clone();
        let disabled = props.disabled;
        Callback::from(move |e: MouseEvent| {
            if !disabled && e.button() == PRIMARY_BUTTON {
                on_step.emit(());
            }
        })
    };

    html! {
        <button
            disabled={props.disabled}
            {onmousedown}
            onmouseup={release.clone()}
            onmouseleave={release}
            {onclick}
        >
            { props.children.clone() }
        </button>
    }
}
