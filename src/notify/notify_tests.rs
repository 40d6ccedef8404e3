//! Unit tests for notification text and transports.

#[cfg(test)]
mod notify_tests {
    use crate::config::TelegramConfig;
    use crate::data::types::{Side, Signal, SignalDraft};
    use crate::error::NotifyError;
    use crate::notify::message::*;
    use crate::notify::telegram::TelegramNotifier;
    use crate::notify::{LogNotifier, Notifier};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn signal(entry: Option<Decimal>, target: Option<Decimal>) -> Signal {
        Signal::from_draft(
            SignalDraft {
                identity: "trade#1:BTC".to_string(),
                trade_date: None,
                asset: "BTC".to_string(),
                side: Side::Buy,
                entry_price: entry,
                target_price: target,
                stop_price: None,
                weight: None,
                status: String::new(),
                notes: String::new(),
            },
            chrono::Utc::now(),
        )
    }

    fn telegram_config(api_base: String) -> TelegramConfig {
        TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "-100".to_string(),
            api_base: Some(api_base),
        }
    }

    /// Accepts one HTTP request, answers with `status`, returns the raw request.
    async fn serve_once(status: u16) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .filter_map(|l| l.split_once(':'))
                        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let body = "{\"ok\":false}";
            let response = format!(
                "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    // ============= Message Tests =============

    #[test]
    fn test_new_trade_message_full() {
        let text = new_trade(&signal(Some(dec!(100)), Some(dec!(120.50))));
        assert_eq!(text, "New trade: BUY BTC @ 100 | Target 120.5");
    }

    #[test]
    fn test_new_trade_message_without_prices() {
        assert_eq!(new_trade(&signal(None, None)), "New trade: BUY BTC");
    }

    #[test]
    fn test_zero_prices_are_not_shown() {
        assert_eq!(new_trade(&signal(Some(dec!(0)), Some(dec!(5)))), "New trade: BUY BTC | Target 5");
    }

    #[test]
    fn test_updated_trade_message() {
        let mut s = signal(Some(dec!(110)), None);
        s.side = Side::Sell;
        assert_eq!(updated_trade(&s), "Updated trade: SELL BTC @ 110");
    }

    #[test]
    fn test_run_failed_message() {
        assert_eq!(run_failed("Sheet fetch failed 500"), "Sheet monitor error: Sheet fetch failed 500");
    }

    // ============= Transport Tests =============

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.send("hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_telegram_posts_chat_and_text() {
        let (base, server) = serve_once(200).await;
        let notifier = TelegramNotifier::new(&telegram_config(base), Duration::from_secs(5)).unwrap();

        notifier.send("New trade: BUY BTC").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /bot123:abc/sendMessage"));
        assert!(request.contains("\"chat_id\":\"-100\""));
        assert!(request.contains("\"text\":\"New trade: BUY BTC\""));
    }

    #[tokio::test]
    async fn test_telegram_non_success_is_error() {
        let (base, server) = serve_once(400).await;
        let notifier = TelegramNotifier::new(&telegram_config(base), Duration::from_secs(5)).unwrap();

        let err = notifier.send("x").await.unwrap_err();
        match err {
            NotifyError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("ok"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        server.await.unwrap();
    }

    #[test]
    fn test_telegram_debug_hides_token() {
        let notifier =
            TelegramNotifier::new(&telegram_config("http://localhost".to_string()), Duration::from_secs(1)).unwrap();
        let rendered = format!("{:?}", notifier);
        assert!(!rendered.contains("123:abc"));
    }
}
