//! QR code rendering for pairing URLs

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageOutputFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

const MODULE_SIZE: u32 = 10;

/// Render `data` as a PNG QR code wrapped in a `data:` URL
pub fn render_qr_data_url(data: &str) -> Result<String> {
    let code = QrCode::new(data.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .quiet_zone(true)
        .build();

    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageOutputFormat::Png)?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_png_data_url() {
        let url = render_qr_data_url("http://192.168.1.5:8001/mobile_page?key=ABC123").unwrap();

        let encoded = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = STANDARD.decode(encoded).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap();
        assert!(decoded.width() >= 21 * MODULE_SIZE);
    }
}
