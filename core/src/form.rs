//! Multipart form bodies for the upload verbs.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormValue {
    Text(String),
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormPart {
    name: String,
    value: FormValue,
}

/// An ordered list of form fields and files, encoded as `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                filename: filename.into(),
                content_type: content_type.into(),
                bytes: bytes.into(),
            },
        });
        self
    }

    /// Encodes the form with a fresh boundary and returns
    /// `(content_type, body)`.
    pub fn encode(&self) -> (String, Vec<u8>) {
        let boundary = format!("----erp-request-{}", Uuid::new_v4().simple());
        let body = self.encode_with_boundary(&boundary);
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    pub fn encode_with_boundary(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match &part.value {
                FormValue::Text(text) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quoted(&part.name)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(text.as_bytes());
                }
                FormValue::File {
                    filename,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {content_type}\r\n\r\n",
                            escape_quoted(&part.name),
                            escape_quoted(filename)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts() {
        let form = FormData::new()
            .text("name", "Acme")
            .file("photo", "logo.png", "image/png", b"PNG".to_vec());
        let body = String::from_utf8(form.encode_with_boundary("XYZ")).unwrap();
        assert_eq!(
            body,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"name\"\r\n\r\n\
             Acme\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"logo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             PNG\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn content_type_carries_the_body_boundary() {
        let form = FormData::new().text("a", "b");
        let (content_type, body) = form.encode();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = String::from_utf8(body).unwrap();
        assert!(body.starts_with(&format!("--{boundary}\r\n")));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let form = FormData::new().text("say \"hi\"", "x");
        let body = String::from_utf8(form.encode_with_boundary("B")).unwrap();
        assert!(body.contains("name=\"say \\\"hi\\\"\""));
    }
}
