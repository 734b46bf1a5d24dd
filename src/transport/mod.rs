//! HTTP transport against the platform's HTML endpoints.
//!
//! The platform has no API: every operation is a GET or a form-encoded POST
//! against a server-rendered page. The transport hands back the raw body plus
//! enough metadata for the bridge to interpret it; a non-2xx status is not an
//! error at this layer, the bridge still runs its best-effort extraction over
//! whatever came back.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::constants::BROWSER_USER_AGENT;
use crate::error::{Error, Result};

/// Raw result of one HTTP round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// Whether the HTTP status was 2xx.
    pub ok: bool,
    pub status: u16,
    /// Response body.
    pub text: String,
}

impl PageResponse {
    /// Parse the body as an HTML document.
    ///
    /// Parsed on demand rather than stored: `Html` is not `Send`, keeping it
    /// out of the response lets futures carrying responses stay `Send`.
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.text)
    }
}

/// One field of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    name: String,
    value: FormValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormValue {
    Text(String),
    List(Vec<String>),
}

impl FormField {
    /// A single-valued field.
    pub fn text(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.to_string()),
        }
    }

    /// An array-valued field, serialized with a `[]`-suffixed key repeated
    /// once per element.
    pub fn list<T: ToString>(name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::List(values.into_iter().map(|v| v.to_string()).collect()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Encode fields as an `application/x-www-form-urlencoded` body.
#[must_use]
pub fn encode_form(fields: &[FormField]) -> String {
    let mut pairs: Vec<String> = Vec::new();
    for field in fields {
        match &field.value {
            FormValue::Text(value) => {
                pairs.push(format!(
                    "{}={}",
                    urlencoding::encode(&field.name),
                    urlencoding::encode(value)
                ));
            }
            FormValue::List(values) => {
                let key = if field.name.ends_with("[]") {
                    field.name.clone()
                } else {
                    format!("{}[]", field.name)
                };
                for value in values {
                    pairs.push(format!(
                        "{}={}",
                        urlencoding::encode(&key),
                        urlencoding::encode(value)
                    ));
                }
            }
        }
    }
    pairs.join("&")
}

/// Field values captured from an existing form, used to replay it with a
/// subset of fields changed (the platform hides tokens and routing fields in
/// its forms, so edits must carry the original values along).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    fields: Vec<(String, String)>,
}

impl FormSnapshot {
    /// Capture the current values of a form element.
    #[must_use]
    pub fn from_element(form: ElementRef<'_>) -> Self {
        static CONTROL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
            Selector::parse("input[name], textarea[name], select[name]").expect("valid selector")
        });
        static OPTION_SELECTOR: Lazy<Selector> =
            Lazy::new(|| Selector::parse("option").expect("valid selector"));

        let mut fields: Vec<(String, String)> = Vec::new();
        for control in form.select(&CONTROL_SELECTOR) {
            let element = control.value();
            let Some(name) = element.attr("name") else {
                continue;
            };
            match element.name() {
                "input" => {
                    let kind = element.attr("type").unwrap_or("text").to_lowercase();
                    match kind.as_str() {
                        "submit" | "button" | "reset" | "image" | "file" => {}
                        "checkbox" | "radio" => {
                            if element.attr("checked").is_some() {
                                let value = element.attr("value").unwrap_or("on");
                                fields.push((name.to_string(), value.to_string()));
                            }
                        }
                        _ => {
                            let value = element.attr("value").unwrap_or("");
                            fields.push((name.to_string(), value.to_string()));
                        }
                    }
                }
                "textarea" => {
                    let value = control.text().collect::<String>();
                    fields.push((name.to_string(), value));
                }
                "select" => {
                    let options: Vec<ElementRef<'_>> = control.select(&OPTION_SELECTOR).collect();
                    let chosen = options
                        .iter()
                        .find(|o| o.value().attr("selected").is_some())
                        .or_else(|| options.first());
                    if let Some(option) = chosen {
                        let value = option
                            .value()
                            .attr("value")
                            .map_or_else(|| option.text().collect::<String>(), String::from);
                        fields.push((name.to_string(), value));
                    }
                }
                _ => {}
            }
        }
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a captured field as a positive integer.
    #[must_use]
    pub fn get_u32(&self, name: &str) -> Option<u32> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Replace the first field with this name, or append it.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name.to_string(), value));
        }
    }

    /// Convert to submission fields, preserving capture order.
    #[must_use]
    pub fn to_fields(&self) -> Vec<FormField> {
        self.fields
            .iter()
            .map(|(name, value)| FormField::text(name, value))
            .collect()
    }
}

/// Transport seam: GET/POST against the platform plus form capture.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PageResponse>;
    async fn post(&self, url: &str, fields: &[FormField]) -> Result<PageResponse>;

    /// Fetch a page and capture the first form matching `selector`.
    async fn get_form(&self, url: &str, selector: &str) -> Result<FormSnapshot>;
}

/// reqwest-backed transport with a cookie store for the forum session.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Build a transport rooted at the forum's base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            base: Url::parse(base_url)?,
        })
    }

    fn absolute(&self, url: &str) -> Result<Url> {
        Ok(self.base.join(url)?)
    }

    async fn read(resp: reqwest::Response) -> Result<PageResponse> {
        let status = resp.status();
        let text = resp.text().await?;
        Ok(PageResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            text,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        let target = self.absolute(url)?;
        tracing::debug!(url = %target, "GET");
        let resp = self.client.get(target).send().await?;
        Self::read(resp).await
    }

    async fn post(&self, url: &str, fields: &[FormField]) -> Result<PageResponse> {
        let target = self.absolute(url)?;
        let body = encode_form(fields);
        tracing::debug!(url = %target, fields = fields.len(), "POST");
        let resp = self
            .client
            .post(target)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .body(body)
            .send()
            .await?;
        Self::read(resp).await
    }

    async fn get_form(&self, url: &str, selector: &str) -> Result<FormSnapshot> {
        let page = self.get(url).await?;
        if !page.ok {
            return Err(Error::HttpStatus {
                status: page.status,
                url: url.to_string(),
            });
        }
        let parsed = Selector::parse(selector)
            .map_err(|_| Error::Validation(format!("invalid form selector: {selector}")))?;
        let doc = page.document();
        let Some(form) = doc.select(&parsed).next() else {
            return Err(Error::FormNotFound {
                url: url.to_string(),
                selector: selector.to_string(),
            });
        };
        Ok(FormSnapshot::from_element(form))
    }
}
