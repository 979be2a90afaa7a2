// src/crawler/extractor.rs
use crate::crawler::heuristics::parse_name;
use crate::models::CandidateRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Role labels the directory uses for its contact field, mapped to the
/// canonical title we emit.
const ROLE_TITLES: &[(&str, &str)] = &[
    ("manager", "Manager"),
    ("owner", "Owner"),
    ("director", "Director"),
    ("founder", "Founder"),
    ("ceo", "CEO"),
    ("proprietor", "Proprietor"),
    ("contact person", "Contact Person"),
];

/// Domains that show up in page markup but never belong to the business:
/// the directory itself, trackers, CDNs, schema vocabularies.
const EMAIL_NOISE_DOMAINS: &[&str] = &[
    "businesslist.ph",
    "example",
    "sentry",
    "cloudflare",
    "googleapis",
    "gstatic",
    "schema.org",
    "w3.org",
    "wixpress",
    "noreply",
    "no-reply",
];

/// Extracts at most one contact candidate per detail page.
///
/// Directory entries are not rendered consistently, so the contact name is
/// resolved through an ordered cascade (structured label blocks, generic
/// label/value siblings, free-text patterns) while company, email, title
/// and employee range are each picked up from whichever source supplies
/// them first.
pub struct ContactExtractor {
    structured_label_selector: Selector,
    generic_label_selector: Selector,
    heading_selector: Selector,
    mailto_selector: Selector,
    email_regex: Regex,
    role_line_regex: Regex,
    by_line_regex: Regex,
    range_text_regex: Regex,
    heading_suffix_regex: Regex,
}

impl ContactExtractor {
    pub fn new() -> Self {
        Self {
            structured_label_selector: Selector::parse("dt, th").unwrap(),
            generic_label_selector: Selector::parse("span, strong, b, label").unwrap(),
            heading_selector: Selector::parse("h1").unwrap(),
            mailto_selector: Selector::parse(r#"a[href^="mailto:"]"#).unwrap(),
            email_regex: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b")
                .unwrap(),
            role_line_regex: Regex::new(
                r"\b(?i:(manager|owner|director|founder|ceo|proprietor|contact person))\s*[:\-]\s*([A-Z][a-z'-]+(?:\s+[A-Z][a-z'-]+)*)",
            )
            .unwrap(),
            by_line_regex: Regex::new(
                r"\b(?i:(managed|owned|founded))\s+(?i:by)\s+([A-Z][a-z'-]+(?:\s+[A-Z][a-z'-]+)*)",
            )
            .unwrap(),
            range_text_regex: Regex::new(
                r"(?i)\b(\d{1,4})\s*(?:-|–|to)\s*(\d{1,4})\s*(?:employees|staff|workers|people)\b",
            )
            .unwrap(),
            heading_suffix_regex: Regex::new(r"\s*[-–]\s*[A-Z][A-Za-z .]*,\s*[A-Z][A-Za-z .]*$")
                .unwrap(),
        }
    }

    pub fn extract(&self, html: &str, source_url: &str) -> Option<CandidateRecord> {
        let document = Html::parse_document(html);

        let company = self.extract_company(&document);
        let email = self.extract_email(&document, html);
        let employee_range = self.extract_employee_range(&document);

        let (first_name, last_name, title) = self
            .scan_label_siblings(&document, &self.structured_label_selector)
            .or_else(|| self.scan_label_siblings(&document, &self.generic_label_selector))
            .or_else(|| self.free_text_contact(&document))?;

        debug!("Extracted {} {} ({}) from {}", first_name, last_name, title, source_url);

        Some(CandidateRecord {
            first_name,
            last_name,
            company,
            email,
            title,
            employee_range,
            source_url: source_url.to_string(),
        })
    }

    /// Walks label-bearing elements matched by `selector` and pairs each
    /// role label with the nearest following element sibling's text. First
    /// pair yielding a valid person name wins.
    fn scan_label_siblings(
        &self,
        document: &Html,
        selector: &Selector,
    ) -> Option<(String, String, String)> {
        for label_el in document.select(selector) {
            let label = element_text(label_el);
            let Some(title) = canonical_title(&label) else {
                continue;
            };
            let Some(value_el) = next_element_sibling(label_el) else {
                continue;
            };
            let (first, last) = parse_name(&element_text(value_el));
            if !first.is_empty() {
                return Some((first, last, title));
            }
        }
        None
    }

    /// Last resort: no structured markup at all. Looks for
    /// "<Role>: <Capitalized Name>" lines and "managed/owned/founded by"
    /// phrasing in the page text.
    fn free_text_contact(&self, document: &Html) -> Option<(String, String, String)> {
        let text = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");

        for caps in self.role_line_regex.captures_iter(&text) {
            let title = canonical_title(&caps[1]);
            let (first, last) = parse_name(&caps[2]);
            if !first.is_empty() {
                if let Some(title) = title {
                    return Some((first, last, title));
                }
            }
        }

        for caps in self.by_line_regex.captures_iter(&text) {
            let title = match caps[1].to_lowercase().as_str() {
                "managed" => "Manager",
                "owned" => "Owner",
                _ => "Founder",
            };
            let (first, last) = parse_name(&caps[2]);
            if !first.is_empty() {
                return Some((first, last, title.to_string()));
            }
        }

        None
    }

    /// Company name comes from the page's primary heading, minus the
    /// "- City, Country" suffix the directory appends.
    fn extract_company(&self, document: &Html) -> String {
        let Some(heading) = document.select(&self.heading_selector).next() else {
            return String::new();
        };
        let text = element_text(heading);
        self.heading_suffix_regex.replace(&text, "").trim().to_string()
    }

    /// Prefer an explicit mail link; otherwise scan the raw markup and take
    /// the first address whose domain is not known noise.
    fn extract_email(&self, document: &Html, raw_html: &str) -> String {
        if let Some(link) = document.select(&self.mailto_selector).next() {
            if let Some(href) = link.value().attr("href") {
                let addr = href
                    .trim_start_matches("mailto:")
                    .split('?')
                    .next()
                    .unwrap_or("")
                    .trim();
                if !addr.is_empty() {
                    return addr.to_lowercase();
                }
            }
        }

        for found in self.email_regex.find_iter(raw_html) {
            let addr = found.as_str().to_lowercase();
            let domain = addr.split('@').nth(1).unwrap_or("");
            let noisy = EMAIL_NOISE_DOMAINS
                .iter()
                .any(|noise| domain.contains(noise) || addr.starts_with("noreply"));
            if !noisy {
                return addr;
            }
        }

        String::new()
    }

    /// Labeled headcount field first, free-text "<N>-<M> employees" second.
    fn extract_employee_range(&self, document: &Html) -> String {
        for label_el in document.select(&self.structured_label_selector) {
            let label = element_text(label_el).to_lowercase();
            let label = label.trim_end_matches(':').trim();
            if label.contains("employee") || label == "staff" || label.contains("company size") {
                if let Some(value_el) = next_element_sibling(label_el) {
                    let value = element_text(value_el);
                    if !value.is_empty() {
                        return value;
                    }
                }
            }
        }

        let text = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(caps) = self.range_text_regex.captures(&text) {
            return format!("{}-{}", &caps[1], &caps[2]);
        }

        String::new()
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical_title(label: &str) -> Option<String> {
    let normalized = label.trim().trim_end_matches(':').trim().to_lowercase();
    ROLE_TITLES
        .iter()
        .find(|(role, _)| *role == normalized)
        .map(|(_, title)| title.to_string())
}

fn next_element_sibling(element: ElementRef) -> Option<ElementRef> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.businesslist.ph/company/acme-trading";

    fn extract(html: &str) -> Option<CandidateRecord> {
        ContactExtractor::new().extract(html, URL)
    }

    #[test]
    fn structured_label_block_wins() {
        let html = r#"
            <html><body>
            <h1>Acme Trading - Makati, Philippines</h1>
            <dl>
              <dt>Manager:</dt><dd>Juan Dela Cruz</dd>
              <dt>Employees:</dt><dd>20-50</dd>
            </dl>
            <a href="mailto:juan@acme.ph">Email us</a>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.first_name, "Juan");
        assert_eq!(record.last_name, "Dela Cruz");
        assert_eq!(record.title, "Manager");
        assert_eq!(record.company, "Acme Trading");
        assert_eq!(record.email, "juan@acme.ph");
        assert_eq!(record.employee_range, "20-50");
        assert_eq!(record.source_url, URL);
    }

    #[test]
    fn table_labels_work_like_definition_lists() {
        let html = r#"
            <html><body>
            <h1>Beta Logistics</h1>
            <table><tr><th>Owner</th><td>Maria Santos</td></tr></table>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.first_name, "Maria");
        assert_eq!(record.last_name, "Santos");
        assert_eq!(record.title, "Owner");
        assert_eq!(record.company, "Beta Logistics");
    }

    #[test]
    fn falls_back_to_generic_sibling_pairs() {
        let html = r#"
            <html><body>
            <h1>Gamma Foods</h1>
            <div><span>Proprietor:</span> <span>Pedro Reyes</span></div>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.first_name, "Pedro");
        assert_eq!(record.last_name, "Reyes");
        assert_eq!(record.title, "Proprietor");
    }

    #[test]
    fn falls_back_to_free_text_role_line() {
        let html = r#"
            <html><body>
            <h1>Delta Prints</h1>
            <p>Contact our shop. Manager: Rosa Mendoza. Open daily.</p>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.first_name, "Rosa");
        assert_eq!(record.last_name, "Mendoza");
        assert_eq!(record.title, "Manager");
    }

    #[test]
    fn falls_back_to_founded_by_phrasing() {
        let html = r#"
            <html><body>
            <h1>Epsilon Motors</h1>
            <p>A family shop founded by Ramon Aquino in 1987.</p>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.first_name, "Ramon");
        assert_eq!(record.last_name, "Aquino");
        assert_eq!(record.title, "Founder");
    }

    #[test]
    fn junk_label_value_falls_through_to_next_tier() {
        let html = r#"
            <html><body>
            <h1>Zeta Traders</h1>
            <dl><dt>Manager:</dt><dd>N/A</dd></dl>
            <p>Proudly owned by Carla Lim.</p>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.first_name, "Carla");
        assert_eq!(record.title, "Owner");
    }

    #[test]
    fn page_without_contact_yields_nothing() {
        let html = r#"
            <html><body>
            <h1>Quiet Corp</h1>
            <p>We sell things. Call us sometime.</p>
            </body></html>
        "#;
        assert!(extract(html).is_none());
    }

    #[test]
    fn email_noise_domains_are_skipped() {
        let html = r#"
            <html><body>
            <h1>Eta Builders</h1>
            <dl><dt>Owner</dt><dd>Luis Garcia</dd></dl>
            <script>window.tracker = "errors@sentry.io";</script>
            <p>Reach us: luis@etabuilders.ph</p>
            <p>Listed on support@businesslist.ph</p>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.email, "luis@etabuilders.ph");
    }

    #[test]
    fn mailto_link_beats_inline_text() {
        let html = r#"
            <html><body>
            <h1>Theta Farms</h1>
            <dl><dt>Owner</dt><dd>Ben Cruz</dd></dl>
            <p>first@inline.ph</p>
            <a href="mailto:Ben@thetafarms.ph?subject=hi">mail</a>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.email, "ben@thetafarms.ph");
    }

    #[test]
    fn employee_range_from_free_text() {
        let html = r#"
            <html><body>
            <h1>Iota Services</h1>
            <dl><dt>Manager</dt><dd>Nina Torres</dd></dl>
            <p>Our team of 25-40 employees serves the metro.</p>
            </body></html>
        "#;
        let record = extract(html).unwrap();
        assert_eq!(record.employee_range, "25-40");
    }

    #[test]
    fn heading_without_location_suffix_is_kept_whole() {
        let html = r#"<html><body>
            <h1>Kappa and Sons</h1>
            <dl><dt>Owner</dt><dd>Tomas Reyes</dd></dl>
        </body></html>"#;
        let record = extract(html).unwrap();
        assert_eq!(record.company, "Kappa and Sons");
    }
}
