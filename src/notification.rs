/// Sink for user-visible failure notices.
pub trait Notifier {
    fn notify(&self, body: &str);
}

/// Desktop notification backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNotifier;

impl Notifier for SystemNotifier {
    fn notify(&self, body: &str) {
        send(body);
    }
}

pub fn send(body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname("mathpad")
        .summary("mathpad")
        .body(&body)
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}
