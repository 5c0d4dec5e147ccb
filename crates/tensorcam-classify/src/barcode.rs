//! Barcode capability.
//!
//! Recognition is delegated to whatever engine implements
//! [`BarcodeScanner`]; this module only carries options and results.

use crate::Result;
use tensorcam_frame::Bitmap;

pub use tensorcam_model::BarcodeFormat;

/// Which symbologies to look for. No formats means all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarcodeOptions {
    formats: Vec<BarcodeFormat>,
}

impl BarcodeOptions {
    pub fn builder() -> BarcodeOptionsBuilder {
        BarcodeOptionsBuilder::default()
    }

    pub fn formats(&self) -> &[BarcodeFormat] {
        &self.formats
    }

    pub fn accepts(&self, format: BarcodeFormat) -> bool {
        self.formats.is_empty() || self.formats.contains(&format)
    }
}

#[derive(Debug, Default)]
pub struct BarcodeOptionsBuilder {
    formats: Vec<BarcodeFormat>,
}

impl BarcodeOptionsBuilder {
    pub fn set_barcode_formats(mut self, formats: impl IntoIterator<Item = BarcodeFormat>) -> Self {
        self.formats.clear();
        for f in formats {
            if !self.formats.contains(&f) {
                self.formats.push(f);
            }
        }
        self
    }

    pub fn build(self) -> BarcodeOptions {
        BarcodeOptions { formats: self.formats }
    }
}

/// A decoded symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    pub format: BarcodeFormat,
    pub display_value: String,
}

pub trait BarcodeScanner {
    fn scan(&mut self, bitmap: &Bitmap, options: &BarcodeOptions) -> Result<Vec<Barcode>>;
}

/// Scan, drop anything the options did not ask for, and log the rest.
pub fn scan_and_log<S: BarcodeScanner + ?Sized>(
    scanner: &mut S,
    bitmap: &Bitmap,
    options: &BarcodeOptions,
) -> Result<Vec<Barcode>> {
    let mut found = scanner.scan(bitmap, options)?;
    found.retain(|b| options.accepts(b.format));
    for b in &found {
        log::debug!("barcode info: {} ({:?})", b.display_value, b.format);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Barcode>);

    impl BarcodeScanner for Fixed {
        fn scan(&mut self, _: &Bitmap, _: &BarcodeOptions) -> Result<Vec<Barcode>> {
            Ok(self.0.clone())
        }
    }

    fn code(format: BarcodeFormat, v: &str) -> Barcode {
        Barcode { format, display_value: v.to_string() }
    }

    #[test]
    fn builder_dedups_formats() {
        let opts = BarcodeOptions::builder()
            .set_barcode_formats([BarcodeFormat::QrCode, BarcodeFormat::Aztec, BarcodeFormat::QrCode])
            .build();
        assert_eq!(opts.formats(), &[BarcodeFormat::QrCode, BarcodeFormat::Aztec]);
        assert!(!opts.accepts(BarcodeFormat::Ean13));
        assert!(BarcodeOptions::default().accepts(BarcodeFormat::Ean13));
    }

    #[test]
    fn scan_filters_unrequested_formats() {
        let mut scanner = Fixed(vec![
            code(BarcodeFormat::QrCode, "https://example.com"),
            code(BarcodeFormat::Code128, "0042"),
        ]);
        let opts = BarcodeOptions::builder().set_barcode_formats([BarcodeFormat::QrCode]).build();
        let found = scan_and_log(&mut scanner, &Bitmap::new(1, 1), &opts).unwrap();
        assert_eq!(found, vec![code(BarcodeFormat::QrCode, "https://example.com")]);
    }
}
