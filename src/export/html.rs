//! Standalone HTML rendering of a [`Report`].
//!
//! No I/O and no external assets beyond a font stylesheet link.  Every
//! interpolated string is escaped.

use super::Report;
use crate::quiz::ChartValues;

const STYLE: &str = "\
body{margin:0;padding:40px 16px;background:#0f0f19;color:#f5f0e1;font-family:'Shippori Mincho B1',serif;}\
.card{max-width:800px;margin:0 auto;padding:40px;border:3px double #d4af37;background:#201335;text-align:center;}\
.sub{letter-spacing:.2em;color:#ffd700;}\
.title{font-family:'Cinzel','Shippori Mincho B1',serif;font-size:2.5em;margin:15px 0;}\
.desc{font-style:italic;font-size:1.2em;}\
.section{margin-top:25px;padding:20px;text-align:left;background:rgba(15,15,25,.9);border:1px solid rgba(255,215,0,.3);}\
.section-title{color:#ffd700;font-weight:bold;border-bottom:1px solid #ffd700;margin-bottom:10px;}\
.advice{background:rgba(255,248,220,.9);color:#3e2723;}\
.advice .section-title{color:#8c5e24;border-color:#8c5e24;}\
table.chart{width:100%;border-collapse:collapse;}\
table.chart td{padding:4px 8px;}\
.bar{height:12px;background:#ffd700;}\
footer{margin-top:30px;font-size:.8em;color:#888;}";

/// Upper bound of the chart axes.
const CHART_MAX: f64 = 10.0;

struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self { buf: String::with_capacity(8 * 1024) }
    }
    fn push<S: AsRef<str>>(&mut self, s: S) {
        self.buf.push_str(s.as_ref());
    }
    fn text(&mut self, s: &str) {
        self.buf.push_str(&esc(s));
    }
    fn finish(self) -> String {
        self.buf
    }
}

pub fn render(report: &Report) -> String {
    let mut w = Html::new();

    w.push("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"UTF-8\">\n<title>運命の鑑定書 - ");
    w.text(report.profile.title);
    w.push("</title>\n<link href=\"https://fonts.googleapis.com/css2?family=Cinzel:wght@700&family=Shippori+Mincho+B1:wght@400;700;900&display=swap\" rel=\"stylesheet\">\n<style>");
    w.push(STYLE);
    w.push("</style>\n</head>\n<body>\n<div class=\"card\">\n");

    w.push("<div class=\"sub\">");
    w.text(report.profile.subtitle);
    w.push("</div>\n<div class=\"title\">");
    w.text(report.profile.title);
    w.push("</div>\n<div class=\"label\">");
    w.text(report.classification.as_str());
    w.push("</div>\n<div class=\"desc\">“");
    w.text(&report.analysis.desc);
    w.push("”</div>\n");

    render_chart(&mut w, &report.chart);
    render_list(&mut w, "🗝️ 今伸ばすべきスキル", &report.analysis.skills);
    render_list(&mut w, "💼 おすすめインターン・適職", &report.analysis.jobs);

    w.push("<div class=\"section advice\">\n<div class=\"section-title\">📜 賢者からの助言</div>\n<div class=\"advice-text\">");
    let lines: Vec<String> = report.advice.lines().map(esc).collect();
    w.push(lines.join("<br>"));
    w.push("</div>\n</div>\n");

    w.push("<footer>Issued by AI Fortune Career · ");
    w.text(&report.issued_at.format("%Y-%m-%d").to_string());
    w.push("</footer>\n</div>\n</body>\n</html>\n");
    w.finish()
}

fn render_chart(w: &mut Html, chart: &ChartValues) {
    w.push("<div class=\"section\">\n<div class=\"section-title\">能力チャート</div>\n<table class=\"chart\">\n");
    for (label, value) in ChartValues::LABELS.iter().zip(chart.values()) {
        let pct = (value / CHART_MAX * 100.0).clamp(0.0, 100.0);
        w.push("<tr><td>");
        w.text(label);
        w.push(format!(
            "</td><td>{value:.1}</td><td style=\"width:60%\"><div class=\"bar\" style=\"width:{pct:.0}%\"></div></td></tr>\n"
        ));
    }
    w.push("</table>\n</div>\n");
}

fn render_list(w: &mut Html, title: &str, items: &[String]) {
    w.push("<div class=\"section\">\n<div class=\"section-title\">");
    w.text(title);
    w.push("</div>\n<ul>\n");
    for item in items {
        w.push("<li>");
        w.text(item);
        w.push("</li>\n");
    }
    w.push("</ul>\n</div>\n");
}

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::analysis::Analysis;
    use crate::quiz::{Category, CategoryTally, Classification};

    fn report(advice: &str, analysis: Analysis) -> Report {
        let tally = CategoryTally::new(5, 4, 1);
        Report::new(
            Classification::blend(Category::Fire, Category::Water),
            ChartValues::from_tally(&tally),
            analysis,
            advice.to_string(),
        )
    }

    #[test]
    fn contains_profile_and_payload() {
        let html = render(&report("line one\nline two", Analysis::fallback()));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("蒼炎の軍師"));
        assert!(html.contains("THE STRATEGIST"));
        assert!(html.contains("fire-water"));
        for item in Analysis::fallback().skills.iter().chain(&Analysis::fallback().jobs) {
            assert!(html.contains(&format!("<li>{item}</li>")));
        }
        assert!(html.contains("line one<br>line two"));
    }

    #[test]
    fn escapes_model_text() {
        let analysis = Analysis {
            skills: vec!["<script>alert(1)</script>".into()],
            jobs: vec!["R&D".into()],
            desc: "\"quoted\"".into(),
        };
        let html = render(&report("<b>bold</b>", analysis));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("R&amp;D"));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn chart_rows_for_every_axis() {
        let html = render(&report("", Analysis::fallback()));
        for label in ChartValues::LABELS {
            assert!(html.contains(label));
        }
        // execution = 5 of 10
        assert!(html.contains("<td>5.0</td>"));
        assert!(html.contains("width:50%"));
    }

    #[test]
    fn esc_passes_plain_text() {
        assert_eq!(esc("運命 abc"), "運命 abc");
    }
}
