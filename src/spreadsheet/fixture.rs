//! Builds minimal `.xlsx` packages for tests.
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[derive(Default)]
pub(crate) struct Workbook {
    /// (name, `<row>` elements)
    sheets: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
    styles: Option<String>,
    active_tab: Option<usize>,
    skip_workbook: bool,
}

impl Workbook {
    pub(crate) fn sheet(mut self, name: &str, rows: &[&str]) -> Self {
        self.sheets.push((name.to_owned(), rows.concat()));
        self
    }

    /// Shared string items, inserted verbatim (already XML-escaped).
    pub(crate) fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = Some(strings.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Inner content of `<styleSheet>`.
    pub(crate) fn styles(mut self, styles: &str) -> Self {
        self.styles = Some(styles.to_owned());
        self
    }

    pub(crate) fn active_tab(mut self, index: usize) -> Self {
        self.active_tab = Some(index);
        self
    }

    pub(crate) fn without_workbook(mut self) -> Self {
        self.skip_workbook = true;
        self
    }

    pub(crate) fn save(&self, path: &Path) {
        let file = File::create(path).expect("create fixture");
        let mut zip = ZipWriter::new(file);
        let mut part = |name: &str, content: String| {
            zip.start_file(name, SimpleFileOptions::default()).expect("start part");
            zip.write_all(content.as_bytes()).expect("write part");
        };

        part("[Content_Types].xml", r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_owned());

        if !self.skip_workbook {
            let mut sheets = String::new();
            let mut relationships = String::new();
            for (index, (name, _)) in self.sheets.iter().enumerate() {
                let id = index + 1;
                sheets.push_str(&format!(r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#));
                relationships.push_str(&format!(
                    r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
                ));
            }
            relationships.push_str(r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
            let views = self
                .active_tab
                .map(|tab| format!(r#"<bookViews><workbookView activeTab="{tab}"/></bookViews>"#))
                .unwrap_or_default();
            part("xl/workbook.xml", format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr/>{views}<sheets>{sheets}</sheets></workbook>"#
            ));
            part("xl/_rels/workbook.xml.rels", format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
            ));
        }

        for (index, (_, rows)) in self.sheets.iter().enumerate() {
            part(&format!("xl/worksheets/sheet{}.xml", index + 1), format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
            ));
        }

        if let Some(strings) = &self.shared_strings {
            let items: String = strings.iter().map(|s| format!("<si><t>{s}</t></si>")).collect();
            part("xl/sharedStrings.xml", format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{items}</sst>"#,
                strings.len()
            ));
        }

        if let Some(styles) = &self.styles {
            part("xl/styles.xml", format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{styles}</styleSheet>"#
            ));
        }

        zip.finish().expect("finish fixture");
    }
}
