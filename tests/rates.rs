use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use reqwest::blocking::Client;

use player_market::config::RateConfig;
use player_market::rates::{DolarApiRates, RateProvider, RateSource};

/// Serve exactly one canned HTTP response on a loopback port.
fn serve_once(status_line: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/v1/dolares/blue")
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/v1/dolares/blue")
}

fn provider(url: String) -> DolarApiRates {
    let client = Client::builder().no_proxy().build().expect("client");
    DolarApiRates::with_client(
        client,
        &RateConfig {
            url,
            ..RateConfig::default()
        },
    )
}

#[test]
fn live_quote_uses_sell_rate() {
    let url = serve_once("200 OK", r#"{"compra":1180.0,"venta":1205.5}"#);
    let quote = provider(url).quote();
    assert_eq!(quote.rate, 1205.5);
    assert_eq!(quote.source, RateSource::Live);
}

#[test]
fn unreachable_service_falls_back_to_1000() {
    let rates = provider(closed_port_url());
    let quote = rates.quote();
    assert_eq!(quote.rate, 1000.0);
    assert!(quote.used_fallback());
    assert_eq!(rates.get_rate(), 1000.0);
}

#[test]
fn malformed_json_falls_back() {
    let url = serve_once("200 OK", "{\"venta\": ");
    let quote = provider(url).quote();
    assert_eq!(quote.rate, 1000.0);
    match quote.source {
        RateSource::Fallback { reason } => assert!(reason.contains("invalid quote json")),
        RateSource::Live => panic!("expected fallback"),
    }
}

#[test]
fn non_success_status_falls_back() {
    let url = serve_once("503 Service Unavailable", r#"{"venta":1300}"#);
    let quote = provider(url).quote();
    assert_eq!(quote.rate, 1000.0);
    assert!(quote.used_fallback());
}
