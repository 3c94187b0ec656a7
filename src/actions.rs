use gc_feed::FeedMsg;

use crate::state::{FilterForm, State};

/// Everything a key press can ask for. Translated from terminal events in
/// `events.rs`, applied to state here; fetch side effects are returned as
/// an [`Effect`] for the app loop to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    CursorUp(usize),
    CursorDown(usize),
    CursorTop,
    CursorBottom,
    OpenDetail,
    CloseDetail,
    OpenFilterForm,
    FormChar(char),
    FormBackspace,
    FormClearField,
    FormNextField,
    FormPrevField,
    FormApply,
    FormCancel,
    RefreshHead,
    DismissToast,
}

/// Fetch work the app loop must do after an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The filter key changed: drop in-flight bookkeeping, fetch a fresh head.
    FilterChanged,
    /// Fetch the head now instead of waiting for the next tick.
    RefreshHead,
}

pub fn apply_action(state: &mut State, action: Action) -> Effect {
    match action {
        Action::None => return Effect::None,
        Action::CursorUp(n) => {
            state.cursor = state.cursor.saturating_sub(n);
            state.clamp_cursor();
        }
        Action::CursorDown(n) => {
            state.cursor += n;
            state.clamp_cursor();
        }
        Action::CursorTop => {
            state.cursor = 0;
            state.scroll = 0;
        }
        Action::CursorBottom => {
            state.cursor = usize::MAX;
            state.clamp_cursor();
        }
        Action::OpenDetail => {
            if !state.detail_open && !state.feed.cache.items.is_empty() {
                state.detail_open = true;
                state.feed.apply(FeedMsg::InteractionOpened);
            }
        }
        Action::CloseDetail => {
            if state.detail_open {
                state.detail_open = false;
                state.feed.apply(FeedMsg::InteractionClosed);
            }
        }
        Action::OpenFilterForm => {
            state.filter_form = Some(FilterForm::from_filter(&state.filter));
        }
        Action::FormChar(c) => {
            if let Some(form) = state.filter_form.as_mut() {
                form.push_char(c);
            }
        }
        Action::FormBackspace => {
            if let Some(form) = state.filter_form.as_mut() {
                form.backspace();
            }
        }
        Action::FormClearField => {
            if let Some(form) = state.filter_form.as_mut() {
                form.clear_field();
            }
        }
        Action::FormNextField => {
            if let Some(form) = state.filter_form.as_mut() {
                form.next_field();
            }
        }
        Action::FormPrevField => {
            if let Some(form) = state.filter_form.as_mut() {
                form.prev_field();
            }
        }
        Action::FormApply => {
            if let Some(form) = state.filter_form.take() {
                let filter = form.to_filter();
                if filter != state.filter {
                    state.filter = filter;
                    state.feed.apply(FeedMsg::FilterChanged(state.filter.key()));
                    state.cursor = 0;
                    state.scroll = 0;
                    state.dirty = true;
                    return Effect::FilterChanged;
                }
            }
        }
        Action::FormCancel => {
            state.filter_form = None;
        }
        Action::RefreshHead => {
            state.dirty = true;
            return Effect::RefreshHead;
        }
        Action::DismissToast => {
            state.toast = None;
        }
    }
    state.dirty = true;
    Effect::None
}
