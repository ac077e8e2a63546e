//! Site header and footer

use super::contact::{contact_email, mailto_link};
use folio_common::content::{non_empty, Contact, Site, DEFAULT_SITE_NAME};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SiteHeader {
    pub name: String,
    pub tagline: String,
    /// Document title, "<name> — Portfolio"
    pub title: String,
    /// Meta description; the tagline, else the name
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Footer {
    pub name: String,
    pub year: i32,
    pub mailto: String,
}

pub fn header(site: &Site) -> SiteHeader {
    let name = site_name(site).to_string();
    let tagline = non_empty(&site.tagline).unwrap_or("").to_string();
    SiteHeader {
        title: format!("{} — Portfolio", name),
        description: if tagline.is_empty() { name.clone() } else { tagline.clone() },
        name,
        tagline,
    }
}

pub fn footer(site: &Site, contact: &Contact, year: i32) -> Footer {
    Footer {
        name: site_name(site).to_string(),
        year,
        mailto: mailto_link(contact_email(contact)),
    }
}

fn site_name(site: &Site) -> &str {
    non_empty(&site.name).unwrap_or(DEFAULT_SITE_NAME)
}
