use anyhow::Result;
use chrono::Local;
use std::cell::RefCell;
use std::rc::Rc;

use crate::modules::overlay::ToastHistory;
use crate::modules::toastr::{Emission, Level, ToastHook, Toastr};

pub const HOOK_NAME: &str = "toast-history";

/// Observes every emission, snapshots the rendered toast, and feeds the overlay.
///
/// Install exactly once per facility; a second install is rejected by the hook registry.
pub struct Interceptor {
    overlay: Rc<RefCell<ToastHistory>>,
    capture: Vec<Level>,
}

impl Interceptor {
    pub fn install(toastr: &mut Toastr, overlay: Rc<RefCell<ToastHistory>>, capture: &[Level]) -> Result<()> {
        let hook = Rc::new(Self { overlay, capture: capture.to_vec() });
        toastr.register_hook(hook)?;
        log::info!("toast history capturing {:?}", capture);
        Ok(())
    }
}

impl ToastHook for Interceptor {
    fn name(&self) -> &str {
        HOOK_NAME
    }

    fn on_emit(&self, emission: &Emission<'_>) {
        if !self.capture.contains(&emission.level) {
            return;
        }
        // Clone now so later changes to the live toast never reach the record.
        let snapshot = emission.toast.borrow().clone();
        let Ok(mut overlay) = self.overlay.try_borrow_mut() else {
            log::error!("toast history busy, dropped {} toast '{}'", emission.level, emission.message);
            return;
        };
        if let Some(id) = overlay.admit(snapshot, emission.options.on_click.clone(), Local::now()) {
            log::debug!("recorded {} toast {:?} as #{}", emission.level, emission.title.unwrap_or(""), id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::history::LevelFilter;
    use crate::modules::overlay::tests::overlay;
    use crate::modules::suppression::Fingerprint;
    use crate::modules::toastr::{ClickHandler, ToastOptions};
    use std::time::Duration;

    fn setup(capture: &[Level]) -> (Toastr, Rc<RefCell<ToastHistory>>) {
        let mut toastr = Toastr::new(Duration::from_secs(5), 5);
        let overlay = Rc::new(RefCell::new(overlay()));
        Interceptor::install(&mut toastr, overlay.clone(), capture).unwrap();
        (toastr, overlay)
    }

    #[test]
    fn emissions_are_recorded_in_order() {
        let (mut toastr, overlay) = setup(&Level::ALL);
        toastr.info("one", None, ToastOptions::default());
        toastr.warning("two", Some("title"), ToastOptions::default());
        toastr.error("three", None, ToastOptions::default());

        let overlay = overlay.borrow();
        let contents: Vec<_> = overlay.history.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["one", "two", "three"]);
        assert_eq!(overlay.history.iter().nth(1).and_then(|r| r.snapshot.title.as_deref()), Some("title"));
    }

    #[test]
    fn returned_handle_is_the_live_toast() {
        let (mut toastr, _overlay) = setup(&Level::ALL);
        let handle = toastr.success("done", None, ToastOptions::default());
        assert!(Rc::ptr_eq(&handle, toastr.live().last().unwrap()));
    }

    #[test]
    fn snapshot_is_isolated_from_live_mutation() {
        let (mut toastr, overlay) = setup(&Level::ALL);
        let handle = toastr.info("original", None, ToastOptions::default());
        handle.borrow_mut().message = Some("changed".to_string());
        handle.borrow_mut().classes.push("hover".to_string());

        let overlay = overlay.borrow();
        let record = overlay.history.iter().next().unwrap();
        assert_eq!(record.content, "original");
        assert_eq!(record.snapshot.message.as_deref(), Some("original"));
        assert!(!record.snapshot.classes.iter().any(|c| c == "hover"));
    }

    #[test]
    fn second_install_is_rejected() {
        let (mut toastr, overlay) = setup(&Level::ALL);
        assert!(Interceptor::install(&mut toastr, overlay.clone(), &Level::ALL).is_err());
        toastr.info("once", None, ToastOptions::default());
        assert_eq!(overlay.borrow().history.len(), 1);
    }

    #[test]
    fn levels_outside_capture_are_ignored() {
        let (mut toastr, overlay) = setup(&[Level::Error]);
        toastr.info("skip", None, ToastOptions::default());
        toastr.error("keep", None, ToastOptions::default());
        assert_eq!(overlay.borrow().history.len(), 1);
    }

    #[test]
    fn click_handler_is_carried_by_identity() {
        let (mut toastr, overlay) = setup(&Level::ALL);
        let handler = ClickHandler::new(|| "clicked".to_string());
        toastr.info("click", None, ToastOptions { on_click: Some(handler.clone()), ..Default::default() });
        let overlay = overlay.borrow();
        assert_eq!(overlay.history.iter().next().unwrap().on_click.as_ref(), Some(&handler));
    }

    #[test]
    fn empty_message_is_recorded_with_empty_content() {
        let (mut toastr, overlay) = setup(&Level::ALL);
        toastr.warning("", Some("only a title"), ToastOptions::default());
        assert_eq!(overlay.borrow().history.iter().next().unwrap().content, "");
    }

    #[test]
    fn connection_lost_scenario() {
        let (mut toastr, overlay) = setup(&Level::ALL);
        toastr.error("Connection lost", None, ToastOptions::default());
        toastr.error("Connection lost", None, ToastOptions::default());
        assert_eq!(overlay.borrow().history.len(), 2);

        let first = overlay.borrow().render(LevelFilter::All)[1].id;
        let (fp, suppressed) = overlay.borrow_mut().toggle_record(first).unwrap();
        assert!(suppressed);
        assert_eq!(fp, Fingerprint::new(Level::Error, "Connection lost"));
        assert_eq!(overlay.borrow().engine.len(), 1);
        assert!(overlay.borrow().render(LevelFilter::All).iter().all(|v| v.suppressed));

        let live_before = toastr.live_len();
        toastr.error("Connection lost", None, ToastOptions::default());
        assert_eq!(overlay.borrow().history.len(), 2);
        // live display is untouched by suppression
        assert_eq!(toastr.live_len(), live_before + 1);
    }
}
