use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use tracing::debug;

/// Text fields of a submitted form, in the order they arrived.
#[derive(Debug, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    /// Value of `name`. A repeated field yields its last value; a missing one
    /// yields the empty string.
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }
}

/// Read the body as `multipart/form-data` or `application/x-www-form-urlencoded`.
/// Anything unreadable counts as an empty form.
pub async fn read_fields(request: Request) -> FormFields {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        });

    if is_multipart {
        read_multipart(request).await
    } else {
        match Form::<Vec<(String, String)>>::from_request(request, &()).await {
            Ok(Form(pairs)) => FormFields(pairs),
            Err(e) => {
                debug!("Unreadable form body: {}", e);
                FormFields::default()
            }
        }
    }
}

async fn read_multipart(request: Request) -> FormFields {
    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(e) => {
            debug!("Unreadable multipart body: {}", e);
            return FormFields::default();
        }
    };

    let mut pairs = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped reading multipart body: {}", e);
                break;
            }
        };

        // Uploaded files are not text fields.
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.text().await {
            Ok(value) => pairs.push((name, value)),
            Err(e) => {
                debug!("Stopped reading multipart field {}: {}", name, e);
                break;
            }
        }
    }

    FormFields(pairs)
}
