use anyhow::{anyhow, Result};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

/// Turns a payment code into something a phone camera can read.
pub trait QrRenderer: Send + Sync {
    fn render(&self, payload: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFormat {
    /// Unicode art for terminal display
    Terminal,
    /// SVG document
    Svg,
}

#[derive(Debug, Clone)]
pub struct QrOptions {
    pub format: QrFormat,
    /// Minimum edge length in pixels, SVG only
    pub size: u32,
    pub quiet_zone: bool,
    pub fg_color: String,
    pub bg_color: String,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            format: QrFormat::Terminal,
            size: 256,
            quiet_zone: true,
            fg_color: "#000000".to_string(),
            bg_color: "#FFFFFF".to_string(),
        }
    }
}

impl QrOptions {
    pub fn terminal() -> Self {
        Self::default()
    }

    pub fn svg(size: u32) -> Self {
        Self {
            format: QrFormat::Svg,
            size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QrCodeRenderer {
    pub options: QrOptions,
}

impl QrCodeRenderer {
    pub fn new(options: QrOptions) -> Self {
        Self { options }
    }
}

impl QrRenderer for QrCodeRenderer {
    fn render(&self, payload: &str) -> Result<String> {
        // Medium correction survives a scratched phone screen.
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|e| anyhow!("QR generation failed: {}", e))?;

        let rendered = match self.options.format {
            QrFormat::Terminal => code
                .render::<char>()
                .quiet_zone(self.options.quiet_zone)
                .module_dimensions(2, 1)
                .build(),
            QrFormat::Svg => code
                .render::<svg::Color>()
                .quiet_zone(self.options.quiet_zone)
                .min_dimensions(self.options.size, self.options.size)
                .dark_color(svg::Color(&self.options.fg_color))
                .light_color(svg::Color(&self.options.bg_color))
                .build(),
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"address":"0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed","amount":"10"}"#;

    #[test]
    fn test_terminal_render() {
        let art = QrCodeRenderer::default().render(PAYLOAD).unwrap();
        assert!(art.lines().count() > 20);
    }

    #[test]
    fn test_svg_render() {
        let svg = QrCodeRenderer::new(QrOptions::svg(128)).render(PAYLOAD).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
    }

    #[test]
    fn test_oversized_payload_fails() {
        let huge = "x".repeat(8_000);
        assert!(QrCodeRenderer::default().render(&huge).is_err());
    }
}
