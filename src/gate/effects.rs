//! Effect collaborators and the liveness guard
//!
//! Navigation, notification and rendering are black boxes supplied by the host.
//! Everything a guarded view does to them goes through [`Liveness::run`], so
//! nothing reaches a view after it has been torn down.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::policy::Frame;
use super::resolver::EffectBatch;

/// Changes the current address. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, address: &str);
}

/// Shows a toast-style message. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Draws whatever frame the gate settles on
pub trait ViewRenderer: Send + Sync {
    fn render(&self, frame: &Frame);
}

/// Navigator and notifier for one guarded view
#[derive(Clone)]
pub struct Effects {
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

impl Effects {
    pub fn new(navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self { navigator, notifier }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Applied,
    /// The view was already gone
    Suppressed,
}

thread_local! {
    // Addresses of every Liveness with a step running on this thread, outermost first
    static ACTIVE_STEPS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

struct Inner {
    revoked: AtomicBool,
    step: Mutex<()>,
}

/// Mounted/unmounted flag shared between a view task and its handle.
///
/// A step started while mounted always runs to completion; `revoke` waits for
/// it unless it is called from inside that step on the same thread, however
/// deeply nested in other views' steps (a navigator whose route change renders
/// another view that tears this one down, for instance).
#[derive(Clone)]
pub struct Liveness {
    inner: Arc<Inner>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                revoked: AtomicBool::new(false),
                step: Mutex::new(()),
            }),
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.inner.revoked.load(Ordering::Acquire)
    }

    /// Mark the view as gone. Returns false if it already was.
    pub fn revoke(&self) -> bool {
        let was_alive = !self.inner.revoked.swap(true, Ordering::AcqRel);
        if !self.in_own_step() {
            // Wait out a step in progress on another thread
            drop(self.lock_step());
        }
        was_alive
    }

    /// Run `f` as one indivisible step if the view is still mounted
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if self.in_own_step() {
            // Nested step on this thread; the outer one holds the lock
            return self.is_alive().then(f);
        }
        let _step = self.lock_step();
        if !self.is_alive() {
            return None;
        }
        let _active = ActiveStep::enter(self.key());
        Some(f())
    }

    /// Notice first, then navigation, as a single step
    pub fn apply(&self, batch: &EffectBatch, effects: &Effects) -> BatchOutcome {
        let applied = self.run(|| {
            effects.notifier.notify(&batch.notice.title, &batch.notice.body);
            effects.navigator.navigate_to(&batch.target);
        });
        match applied {
            Some(()) => BatchOutcome::Applied,
            None => BatchOutcome::Suppressed,
        }
    }

    /// Draw a frame if the view is still mounted
    pub fn render(&self, renderer: &dyn ViewRenderer, frame: &Frame) -> bool {
        self.run(|| renderer.render(frame)).is_some()
    }

    fn key(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn in_own_step(&self) -> bool {
        let key = self.key();
        ACTIVE_STEPS.with(|active| active.borrow().contains(&key))
    }

    fn lock_step(&self) -> std::sync::MutexGuard<'_, ()> {
        // A panicking collaborator must not wedge teardown
        self.inner.step.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks this thread as running a step; pops the marker on drop
struct ActiveStep;

impl ActiveStep {
    fn enter(key: usize) -> Self {
        ACTIVE_STEPS.with(|active| active.borrow_mut().push(key));
        Self
    }
}

impl Drop for ActiveStep {
    fn drop(&mut self) {
        ACTIVE_STEPS.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::policy::Notice;

    #[derive(Default)]
    struct Journal {
        entries: Mutex<Vec<String>>,
    }

    impl Journal {
        fn push(&self, entry: String) {
            self.entries.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl Navigator for Journal {
        fn navigate_to(&self, address: &str) {
            self.push(format!("navigate:{}", address));
        }
    }

    impl Notifier for Journal {
        fn notify(&self, title: &str, _body: &str) {
            self.push(format!("notify:{}", title));
        }
    }

    /// Navigator that unmounts the view it belongs to, like a router would
    struct TearingNavigator {
        journal: Arc<Journal>,
        liveness: Liveness,
    }

    impl Navigator for TearingNavigator {
        fn navigate_to(&self, address: &str) {
            self.journal.navigate_to(address);
            self.liveness.revoke();
        }
    }

    fn batch() -> EffectBatch {
        EffectBatch {
            notice: Notice {
                title: "Admin Profile".to_string(),
                body: "Go to the dashboard".to_string(),
            },
            target: "/dashboard".to_string(),
        }
    }

    #[test]
    fn test_notice_precedes_navigation() {
        let journal = Arc::new(Journal::default());
        let effects = Effects::new(journal.clone(), journal.clone());
        let liveness = Liveness::new();

        assert_eq!(liveness.apply(&batch(), &effects), BatchOutcome::Applied);
        assert_eq!(journal.entries(), vec!["notify:Admin Profile", "navigate:/dashboard"]);
    }

    #[test]
    fn test_revoked_suppresses_everything() {
        let journal = Arc::new(Journal::default());
        let effects = Effects::new(journal.clone(), journal.clone());
        let liveness = Liveness::new();

        assert!(liveness.revoke());
        assert!(!liveness.revoke());
        assert_eq!(liveness.apply(&batch(), &effects), BatchOutcome::Suppressed);
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_revoke_from_inside_step_does_not_deadlock() {
        let journal = Arc::new(Journal::default());
        let liveness = Liveness::new();
        let navigator = Arc::new(TearingNavigator {
            journal: journal.clone(),
            liveness: liveness.clone(),
        });
        let effects = Effects::new(navigator, journal.clone());

        assert_eq!(liveness.apply(&batch(), &effects), BatchOutcome::Applied);
        assert!(!liveness.is_alive());
        assert_eq!(journal.entries().len(), 2);

        // Nothing after teardown
        assert_eq!(liveness.apply(&batch(), &effects), BatchOutcome::Suppressed);
        assert_eq!(journal.entries().len(), 2);
    }

    #[test]
    fn test_revoke_outer_view_from_nested_step() {
        let outer = Liveness::new();
        let inner = Liveness::new();
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        {
            let outer = outer.clone();
            std::thread::spawn(move || {
                let result = outer.run(|| inner.run(|| outer.revoke()));
                let _ = done_tx.send(result);
            });
        }

        let result = done_rx
            .recv_timeout(std::time::Duration::from_secs(3))
            .expect("revoking the outer view from a nested step hung");
        assert_eq!(result, Some(Some(true)));
        assert!(!outer.is_alive());
        assert!(outer.run(|| ()).is_none());
    }

    #[test]
    fn test_revoke_waits_for_step_on_other_thread() {
        let liveness = Liveness::new();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let worker = {
            let liveness = liveness.clone();
            std::thread::spawn(move || {
                liveness.run(|| {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                })
            })
        };

        entered_rx.recv().unwrap();
        let revoker = {
            let liveness = liveness.clone();
            std::thread::spawn(move || liveness.revoke())
        };

        release_tx.send(()).unwrap();
        assert!(worker.join().unwrap().is_some());
        assert!(revoker.join().unwrap());
        assert!(liveness.run(|| ()).is_none());
    }
}
