//! Disk-backed export sink.
//!
//! Materializes each requested format's artifact bundle under
//! `<root>/jobs/<job_id>/<format>/`: panel images are downloaded next to a
//! `book.json` manifest, `web` additionally gets a self-contained HTML
//! viewer, and `video` gets a clip manifest. Byte-level PDF/CBZ encoding
//! is delegated to downstream tooling that consumes the bundle; the
//! pipeline only ever sees the [`ExportSink`] interface.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use inkforge_core::artwork::AssembledBook;
use inkforge_core::generation::OutputFormat;
use inkforge_core::job::ArtifactRef;
use inkforge_pipeline::export::{ExportError, ExportSink};

pub struct DiskExportSink {
    http: reqwest::Client,
    root: PathBuf,
}

impl DiskExportSink {
    /// Sink writing under `root` (the service's output directory).
    pub fn new(root: PathBuf) -> Self {
        Self {
            http: reqwest::Client::new(),
            root,
        }
    }

    /// Download every panel image into `dir/pages/`, returning the
    /// relative file name per panel in panel order.
    async fn download_pages(
        &self,
        book: &AssembledBook,
        dir: &Path,
    ) -> Result<Vec<String>, ExportError> {
        let pages_dir = dir.join("pages");
        tokio::fs::create_dir_all(&pages_dir).await?;

        let mut files = Vec::with_capacity(book.artwork.panels.len());
        for art in &book.artwork.panels {
            let response = self
                .http
                .get(&art.image_url)
                .send()
                .await
                .map_err(|e| ExportError::Failed(format!("Fetching panel {}: {e}", art.panel)))?;
            if !response.status().is_success() {
                return Err(ExportError::Failed(format!(
                    "Fetching panel {} returned HTTP {}",
                    art.panel,
                    response.status()
                )));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ExportError::Failed(format!("Reading panel {}: {e}", art.panel)))?;

            let name = format!("panel_{:03}.png", art.panel);
            tokio::fs::write(pages_dir.join(&name), &bytes).await?;
            files.push(format!("pages/{name}"));
        }
        Ok(files)
    }

    /// The per-panel manifest consumed by downstream encoders.
    fn book_manifest(book: &AssembledBook, page_files: &[String]) -> serde_json::Value {
        let panels: Vec<serde_json::Value> = book
            .script
            .panels
            .iter()
            .enumerate()
            .map(|(i, panel)| {
                let text = &book.texts[i];
                serde_json::json!({
                    "number": panel.number,
                    "page": panel.page,
                    "description": panel.description,
                    "mood": panel.mood,
                    "caption": text.caption,
                    "dialogue": text.dialogue,
                    "image": page_files.get(i),
                })
            })
            .collect();

        serde_json::json!({
            "title": book.title,
            "art_style": book.art_style,
            "target_audience": book.target_audience,
            "total_pages": book.script.total_pages,
            "total_panels": book.script.panels.len(),
            "panels": panels,
        })
    }
}

#[async_trait]
impl ExportSink for DiskExportSink {
    async fn export(
        &self,
        book: &AssembledBook,
        format: OutputFormat,
    ) -> Result<ArtifactRef, ExportError> {
        let dir = self
            .root
            .join("jobs")
            .join(book.job_id.to_string())
            .join(format.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let artifact = match format {
            OutputFormat::Video => {
                let clips = book.clips.as_ref().ok_or_else(|| {
                    ExportError::Failed("Video export requested without clips".to_string())
                })?;
                let manifest = serde_json::json!({
                    "title": book.title,
                    "clips": clips.clips,
                });
                let path = dir.join("clips.json");
                tokio::fs::write(&path, serde_json::to_vec_pretty(&manifest)?).await?;
                ArtifactRef {
                    path,
                    content_type: "application/json".to_string(),
                }
            }
            OutputFormat::Web => {
                let page_files = self.download_pages(book, &dir).await?;
                let manifest = Self::book_manifest(book, &page_files);
                tokio::fs::write(dir.join("book.json"), serde_json::to_vec_pretty(&manifest)?)
                    .await?;
                let path = dir.join("index.html");
                tokio::fs::write(&path, render_html(book, &page_files)).await?;
                ArtifactRef {
                    path,
                    content_type: "text/html".to_string(),
                }
            }
            OutputFormat::Pdf | OutputFormat::Cbz => {
                let page_files = self.download_pages(book, &dir).await?;
                let manifest = Self::book_manifest(book, &page_files);
                let path = dir.join("book.json");
                tokio::fs::write(&path, serde_json::to_vec_pretty(&manifest)?).await?;
                ArtifactRef {
                    path,
                    content_type: "application/json".to_string(),
                }
            }
        };

        Ok(artifact)
    }
}

/// Minimal single-file comic viewer.
fn render_html(book: &AssembledBook, page_files: &[String]) -> String {
    let mut panels_html = String::new();
    for (i, panel) in book.script.panels.iter().enumerate() {
        let text = &book.texts[i];
        let image = page_files.get(i).map(String::as_str).unwrap_or("");

        panels_html.push_str(&format!(
            "    <figure class=\"panel\">\n      <img src=\"{image}\" alt=\"Panel {}\">\n",
            panel.number
        ));
        if let Some(caption) = &text.caption {
            panels_html.push_str(&format!(
                "      <figcaption class=\"caption\">{}</figcaption>\n",
                escape_html(caption)
            ));
        }
        for line in &text.dialogue {
            panels_html.push_str(&format!(
                "      <p class=\"dialogue\"><strong>{}:</strong> {}</p>\n",
                escape_html(&line.speaker),
                escape_html(&line.line)
            ));
        }
        panels_html.push_str("    </figure>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  \
         <title>{title}</title>\n  <style>\n    body {{ font-family: sans-serif; background: #111; \
         color: #eee; margin: 0 auto; max-width: 900px; }}\n    .panel {{ margin: 2rem 0; }}\n    \
         .panel img {{ width: 100%; border-radius: 4px; }}\n    .caption {{ font-style: italic; \
         margin-top: 0.5rem; }}\n    .dialogue {{ margin: 0.25rem 0; }}\n  </style>\n</head>\n\
         <body>\n  <h1>{title}</h1>\n  <main>\n{panels_html}  </main>\n</body>\n</html>\n",
        title = escape_html(&book.title),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use inkforge_core::artwork::{ArtworkSet, PanelArt};
    use inkforge_core::generation::{ArtStyle, Audience};
    use inkforge_core::script::{ComicScript, DialogueLine, Panel, PanelText};

    fn book() -> AssembledBook {
        AssembledBook {
            job_id: uuid::Uuid::new_v4(),
            title: "Ava & The <City>".to_string(),
            art_style: ArtStyle::Cartoon,
            target_audience: Audience::General,
            script: ComicScript {
                title: "Ava".to_string(),
                total_pages: 1,
                panels: vec![Panel {
                    number: 1,
                    page: 1,
                    description: "Ava arrives".to_string(),
                    mood: "bright".to_string(),
                    camera_angle: None,
                    characters: vec![],
                }],
            },
            texts: vec![PanelText {
                panel: 1,
                caption: Some("The city at dawn.".to_string()),
                dialogue: vec![DialogueLine {
                    speaker: "Ava".to_string(),
                    line: "Finally.".to_string(),
                }],
            }],
            artwork: ArtworkSet {
                panels: vec![PanelArt {
                    panel: 1,
                    image_url: "https://img.test/1.png".to_string(),
                    prompt: "p".to_string(),
                }],
            },
            clips: None,
        }
    }

    #[test]
    fn html_escapes_title_and_includes_caption_and_dialogue() {
        let html = render_html(&book(), &["pages/panel_001.png".to_string()]);
        assert!(html.contains("Ava &amp; The &lt;City&gt;"));
        assert!(html.contains("The city at dawn."));
        assert!(html.contains("<strong>Ava:</strong> Finally."));
        assert!(html.contains("pages/panel_001.png"));
    }

    #[test]
    fn manifest_joins_script_texts_and_pages() {
        let manifest =
            DiskExportSink::book_manifest(&book(), &["pages/panel_001.png".to_string()]);
        assert_eq!(manifest["total_panels"], 1);
        assert_eq!(manifest["panels"][0]["number"], 1);
        assert_eq!(manifest["panels"][0]["caption"], "The city at dawn.");
        assert_eq!(manifest["panels"][0]["image"], "pages/panel_001.png");
    }
}
