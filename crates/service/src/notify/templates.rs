//! HTML bodies for booking and contact notifications, rendered through
//! askama (`templates/mail/`), which escapes every interpolated value.

use askama::Template;
use models::{booking, contact};

use super::mailer::{MailError, OutgoingMail};

/// One labelled line of the details table.
pub struct Row {
    pub label: &'static str,
    pub value: String,
}

impl Row {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into() }
    }
}

#[derive(Template)]
#[template(path = "mail/booking_acknowledgement.html")]
struct BookingAcknowledgement<'a> {
    name: &'a str,
    rows: Vec<Row>,
}

#[derive(Template)]
#[template(path = "mail/booking_alert.html")]
struct BookingAlert {
    rows: Vec<Row>,
}

#[derive(Template)]
#[template(path = "mail/contact_acknowledgement.html")]
struct ContactAcknowledgement<'a> {
    name: &'a str,
    rows: Vec<Row>,
}

#[derive(Template)]
#[template(path = "mail/contact_alert.html")]
struct ContactAlert {
    rows: Vec<Row>,
}

fn booking_rows(b: &booking::Model) -> Vec<Row> {
    let mut rows = vec![
        Row::new("Booking reference", b.booking_id.as_str()),
        Row::new("Name", b.full_name.as_str()),
        Row::new("Email", b.email.as_str()),
        Row::new("Phone", b.phone.as_str()),
        Row::new("Service", b.service_name.as_str()),
    ];
    if let Some(sub) = &b.sub_service_name {
        rows.push(Row::new("Option", sub.as_str()));
    }
    if let Some(price) = b.sub_service_price {
        rows.push(Row::new("Quoted price", format!("{price:.2}")));
    }
    if let Some(from) = &b.from_address {
        rows.push(Row::new("Moving from", from.as_str()));
    }
    if let Some(to) = &b.to_address {
        rows.push(Row::new("Moving to", to.as_str()));
    }
    if let Some(date) = b.move_date {
        rows.push(Row::new("Move date", date.format("%d %B %Y").to_string()));
    }
    rows.push(Row::new("Notes", b.notes.as_str()));
    rows
}

fn contact_rows(c: &contact::Model) -> Vec<Row> {
    vec![
        Row::new("Name", c.fullname.as_str()),
        Row::new("Email", c.email.as_str()),
        Row::new("Phone", c.phone.as_str()),
        Row::new("Service", c.service_required.label()),
        Row::new("Message", c.message.as_str()),
    ]
}

pub fn booking_acknowledgement(b: &booking::Model) -> Result<OutgoingMail, MailError> {
    let html = BookingAcknowledgement { name: &b.full_name, rows: booking_rows(b) }.render()?;
    Ok(OutgoingMail { to: b.email.clone(), subject: format!("We received your booking {}", b.booking_id), html })
}

pub fn booking_alert(b: &booking::Model, admin: &str) -> Result<OutgoingMail, MailError> {
    let html = BookingAlert { rows: booking_rows(b) }.render()?;
    Ok(OutgoingMail {
        to: admin.to_string(),
        subject: format!("New booking {} from {}", b.booking_id, b.full_name),
        html,
    })
}

pub fn contact_acknowledgement(c: &contact::Model) -> Result<OutgoingMail, MailError> {
    let html = ContactAcknowledgement { name: &c.fullname, rows: contact_rows(c) }.render()?;
    Ok(OutgoingMail { to: c.email.clone(), subject: "Thanks for getting in touch".to_string(), html })
}

pub fn contact_alert(c: &contact::Model, admin: &str) -> Result<OutgoingMail, MailError> {
    let html = ContactAlert { rows: contact_rows(c) }.render()?;
    Ok(OutgoingMail {
        to: admin.to_string(),
        subject: format!("New enquiry from {} ({})", c.fullname, c.service_required.label()),
        html,
    })
}
