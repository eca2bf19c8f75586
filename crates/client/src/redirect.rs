//! Remote redirects out of the embedded app frame.

use tokio::sync::mpsc::UnboundedSender;

/// Navigates the top-level window to a URL outside the app.
pub trait Redirect: Send + Sync {
    fn dispatch_remote(&self, url: &str);
}

impl<F> Redirect for F
where
    F: Fn(&str) + Send + Sync,
{
    fn dispatch_remote(&self, url: &str) {
        self(url);
    }
}

/// Forwards the URL to whoever owns the receiving end, typically the UI loop.
impl Redirect for UnboundedSender<String> {
    fn dispatch_remote(&self, url: &str) {
        if self.send(url.to_string()).is_err() {
            tracing::warn!(url, "Redirect receiver dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_closure_redirect() {
        let seen = Mutex::new(Vec::new());
        let redirect = |url: &str| seen.lock().unwrap().push(url.to_string());

        redirect.dispatch_remote("/auth");

        assert_eq!(*seen.lock().unwrap(), vec!["/auth".to_string()]);
    }

    #[tokio::test]
    async fn test_channel_redirect() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        tx.dispatch_remote("https://app.example.com/online/auth?shop=store.myshopify.com");

        assert_eq!(
            rx.recv().await.unwrap(),
            "https://app.example.com/online/auth?shop=store.myshopify.com"
        );
    }

    #[test]
    fn test_channel_redirect_without_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        drop(rx);

        tx.dispatch_remote("/auth");
    }
}
