//! services/twiml.rs
//! Generador mínimo de TwiML (el XML que Twilio interpreta en una llamada).
//! Cubre solo los verbos que usa este proyecto: Say, Play, Gather y Hangup.

/// Escapa texto para contenido y atributos XML.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Bloque Gather: recoge dígitos DTMF y los manda al action.
#[derive(Debug, Clone)]
pub struct Gather {
    action: String,
    num_digits: u32,
    timeout_secs: u32,
    say: Option<(String, String)>, // (texto, idioma)
}

impl Gather {
    pub fn new(action: &str) -> Self {
        Gather {
            action: action.to_string(),
            num_digits: 4,
            timeout_secs: 10,
            say: None,
        }
    }

    pub fn num_digits(mut self, n: u32) -> Self {
        self.num_digits = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Mensaje que se lee mientras se espera la entrada.
    pub fn say(mut self, text: &str, language: &str) -> Self {
        self.say = Some((text.to_string(), language.to_string()));
        self
    }

    fn render(&self) -> String {
        let mut xml = format!(
            r#"<Gather input="dtmf" numDigits="{}" action="{}" method="POST" timeout="{}">"#,
            self.num_digits,
            escape_xml(&self.action),
            self.timeout_secs
        );
        if let Some((text, lang)) = &self.say {
            xml.push_str(&format!(
                r#"<Say language="{}">{}</Say>"#,
                escape_xml(lang),
                escape_xml(text)
            ));
        }
        xml.push_str("</Gather>");
        xml
    }
}

/// Documento de respuesta de voz. Se arma verbo por verbo y se
/// serializa con to_xml().
#[derive(Debug, Clone, Default)]
pub struct VoiceResponse {
    parts: Vec<String>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        VoiceResponse { parts: Vec::new() }
    }

    pub fn say(&mut self, text: &str, language: &str) -> &mut Self {
        self.parts.push(format!(
            r#"<Say language="{}">{}</Say>"#,
            escape_xml(language),
            escape_xml(text)
        ));
        self
    }

    pub fn play(&mut self, url: &str) -> &mut Self {
        self.parts
            .push(format!("<Play>{}</Play>", escape_xml(url)));
        self
    }

    pub fn gather(&mut self, gather: Gather) -> &mut Self {
        self.parts.push(gather.render());
        self
    }

    pub fn hangup(&mut self) -> &mut Self {
        self.parts.push("<Hangup/>".to_string());
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for part in &self.parts {
            xml.push_str(part);
        }
        xml.push_str("</Response>");
        xml
    }
}
