use std::sync::atomic::{AtomicBool, Ordering};

static RUNNING: AtomicBool = AtomicBool::new(false);

#[derive(Debug, thiserror::Error)]
#[error("⚠️ Multiple Reverso->Anki instances running! Stop all but one.")]
pub struct DuplicateInstance;

/// Claimed once at startup so two activations never observe the same page.
/// Released on drop.
///
/// The flag lives in this process only; separate `revanki` processes do not
/// see each other's guard.
#[derive(Debug)]
pub struct InstanceGuard(());

impl InstanceGuard {
    pub fn acquire() -> Result<Self, DuplicateInstance> {
        RUNNING
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InstanceGuard(()))
            .map_err(|_| DuplicateInstance)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        RUNNING.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_instance_is_rejected() {
        let guard = InstanceGuard::acquire().unwrap();
        assert!(InstanceGuard::acquire().is_err());

        drop(guard);
        assert!(InstanceGuard::acquire().is_ok());
    }
}
