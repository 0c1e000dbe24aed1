use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use super::config::ServiceContext;
use super::notifier::{AlertDispatcher, AlertEvent, SpanSnapshot};

const SENSITIVE_MARKERS: [&str; 7] = [
    "secret",
    "password",
    "token",
    "authorization",
    "webhook",
    "api_key",
    "email",
];

pub(crate) struct AlertLayer {
    dispatcher: AlertDispatcher,
    service: ServiceContext,
    min_level: Level,
}

impl AlertLayer {
    pub(crate) fn new(dispatcher: AlertDispatcher, service: ServiceContext, min_level: Level) -> Self {
        Self {
            dispatcher,
            service,
            min_level,
        }
    }
}

#[derive(Default)]
struct Fields(BTreeMap<String, String>);

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        let value = if is_sensitive(field.name()) {
            "[REDACTED]".to_string()
        } else {
            value
        };
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

struct StoredSpanFields(BTreeMap<String, String>);

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(StoredSpanFields(fields.0));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Fields::default();
        values.record(&mut fields);

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<StoredSpanFields>() {
            Some(stored) => stored.0.extend(fields.0),
            None => extensions.insert(StoredSpanFields(fields.0)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering is inverted: ERROR is the "smallest" level.
        if *metadata.level() > self.min_level {
            return;
        }
        // Delivery failures are logged from the dispatcher itself.
        if metadata.target().starts_with(module_path!().trim_end_matches("::layer")) {
            return;
        }

        let mut fields = Fields::default();
        event.record(&mut fields);
        let message = fields.0.remove("message");

        let spans = ctx
            .event_span(event)
            .map(|leaf| {
                leaf.scope()
                    .from_root()
                    .map(|span| SpanSnapshot {
                        name: span.name().to_string(),
                        fields: span
                            .extensions()
                            .get::<StoredSpanFields>()
                            .map(|stored| stored.0.clone())
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.dispatcher.submit(AlertEvent {
            level: *metadata.level(),
            at: Utc::now(),
            service_name: self.service.service_name.clone(),
            stage: self.service.stage.clone(),
            component: self.service.component.clone(),
            target: metadata.target().to_string(),
            location: metadata
                .file()
                .zip(metadata.line())
                .map(|(file, line)| format!("{file}:{line}")),
            message,
            fields: fields.0,
            spans,
        });
    }
}

fn is_sensitive(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SENSITIVE_MARKERS.iter().any(|marker| name.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_field_names_are_detected() {
        assert!(is_sensitive("JWT_SECRET"));
        assert!(is_sensitive("notification_email"));
        assert!(is_sensitive("google_api_key"));
        assert!(!is_sensitive("restaurant_id"));
        assert!(!is_sensitive("ip_address"));
    }
}
