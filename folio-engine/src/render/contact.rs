//! Contact section

use super::{LinkView, RenderContext, RenderedSection, SectionBody};
use crate::registry::{CardId, CardRole, SectionKey};
use folio_common::content::{non_empty, Contact};
use serde::Serialize;
use url::Url;

/// Address shown when the document has none
pub const DEFAULT_EMAIL: &str = "you@example.com";

/// Subject prefilled on compose links
pub const MAIL_SUBJECT: &str = "Hello from your portfolio";

#[derive(Debug, Clone, Serialize)]
pub struct ContactBody {
    pub card: CardId,
    pub email: String,
    /// Compose link with the subject prefilled
    pub mailto: String,
    pub links: Vec<LinkView>,
}

pub fn render(contact: &Contact, ctx: &mut RenderContext<'_>) -> RenderedSection {
    let key = SectionKey::Contact;
    let card = ctx.registry.add(key, CardRole::Contact, "Contact", Vec::new(), false);
    let email = contact_email(contact).to_string();

    RenderedSection {
        key,
        intro: None,
        chip_tags: Vec::new(),
        body: SectionBody::Contact(ContactBody {
            card,
            mailto: mailto_link(&email),
            email,
            links: contact.links.iter().map(LinkView::from).collect(),
        }),
    }
}

/// Email address to show and copy
pub fn contact_email(contact: &Contact) -> &str {
    non_empty(&contact.email).unwrap_or(DEFAULT_EMAIL)
}

/// `mailto:` link with the portfolio subject
pub fn mailto_link(email: &str) -> String {
    match Url::parse(&format!("mailto:{}", email)) {
        Ok(mut url) => {
            url.set_query(Some(&format!("subject={}", MAIL_SUBJECT)));
            url.to_string()
        }
        Err(_) => format!("mailto:{}?subject={}", email, MAIL_SUBJECT.replace(' ', "%20")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailto_encodes_subject() {
        assert_eq!(
            mailto_link("me@site.dev"),
            "mailto:me@site.dev?subject=Hello%20from%20your%20portfolio"
        );
    }

    #[test]
    fn test_default_email() {
        assert_eq!(contact_email(&Contact::default()), DEFAULT_EMAIL);
        let contact = Contact {
            email: Some("a@b.c".into()),
            links: Vec::new(),
        };
        assert_eq!(contact_email(&contact), "a@b.c");
    }
}
