//! Machine-readable site descriptions: XML sitemap, RSS, OpenSearch, robots.txt.
//!
//! All links are absolute, so callers pass a pather built with
//! [`Pather::absolute`].

use std::fmt::Write;

use folio_repo::{Item, Route};

use crate::escape::escape_xml;
use crate::mapper::format_date;
use crate::pather::Pather;

/// Site-level metadata for feeds.
#[derive(Clone, Debug, Default)]
pub struct Channel<'a> {
    /// Site title.
    pub title: &'a str,
    /// Site description.
    pub description: &'a str,
}

/// XML sitemap (sitemaps.org protocol) listing every item.
#[must_use]
pub fn sitemap_xml(items: &[&Item], pather: &Pather) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for item in items {
        let _ = write!(
            xml,
            "<url><loc>{}</loc>",
            escape_xml(&pather.route_path(&item.route))
        );
        let date = format_date(item.meta.date);
        if !date.is_empty() {
            let _ = write!(xml, "<lastmod>{date}</lastmod>");
        }
        xml.push_str("</url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// RSS 2.0 feed of the `limit` newest dated items.
///
/// Undated items are left out; ties on date are broken by route.
#[must_use]
pub fn rss(channel: &Channel<'_>, items: &[&Item], pather: &Pather, limit: usize) -> String {
    let mut dated: Vec<&Item> = items
        .iter()
        .copied()
        .filter(|item| item.meta.date.is_some())
        .collect();
    dated.sort_by(|a, b| b.meta.date.cmp(&a.meta.date).then_with(|| a.route.cmp(&b.route)));
    dated.truncate(limit);

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n",
    );
    let _ = writeln!(
        xml,
        "<title>{}</title>\n<link>{}</link>\n<description>{}</description>",
        escape_xml(channel.title),
        escape_xml(&pather.route_path(&Route::root())),
        escape_xml(channel.description)
    );

    for item in dated {
        let link = pather.route_path(&item.route);
        let _ = writeln!(
            xml,
            "<item>\n<title>{}</title>\n<link>{1}</link>\n<guid>{1}</guid>\n<description>{2}</description>",
            escape_xml(&item.title),
            escape_xml(&link),
            escape_xml(&item.description)
        );
        if let Some(date) = item.meta.date
            && let Some(midnight) = date.and_hms_opt(0, 0, 0)
        {
            let _ = writeln!(
                xml,
                "<pubDate>{}</pubDate>",
                midnight.and_utc().to_rfc2822()
            );
        }
        xml.push_str("</item>\n");
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

/// OpenSearch description pointing at the search page.
#[must_use]
pub fn opensearch(channel: &Channel<'_>, pather: &Pather) -> String {
    let mut search = pather.path("/search");
    search.push_str("?q={searchTerms}");
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <OpenSearchDescription xmlns=\"http://a9.com/-/spec/opensearch/1.1/\">\n\
         <ShortName>{}</ShortName>\n\
         <Description>{}</Description>\n\
         <InputEncoding>UTF-8</InputEncoding>\n\
         <Url type=\"text/html\" template=\"{}\"/>\n\
         </OpenSearchDescription>\n",
        escape_xml(channel.title),
        escape_xml(channel.description),
        escape_xml(&search)
    )
}

/// robots.txt allowing everything and announcing the XML sitemap.
#[must_use]
pub fn robots_txt(pather: &Pather) -> String {
    format!(
        "User-agent: *\nDisallow: /debug/\n\nSitemap: {}\n",
        pather.path("/sitemap.xml")
    )
}
