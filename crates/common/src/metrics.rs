use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static BOOKINGS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "movedesk_bookings_created_total",
        "Total bookings accepted"
    )
    .expect("register bookings_created_total")
});

pub static CONTACTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "movedesk_contacts_created_total",
        "Total contact requests accepted"
    )
    .expect("register contacts_created_total")
});

pub static MAIL_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "movedesk_mail_sent_total",
        "Total notification emails handed to the relay"
    )
    .expect("register mail_sent_total")
});

pub static MAIL_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "movedesk_mail_failures_total",
        "Total notification emails the relay rejected"
    )
    .expect("register mail_failures_total")
});

/// Render every registered metric in the Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        BOOKINGS_CREATED_TOTAL.inc();
        MAIL_FAILURES_TOTAL.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("movedesk_bookings_created_total"));
        assert!(text.contains("movedesk_mail_failures_total"));
    }
}
