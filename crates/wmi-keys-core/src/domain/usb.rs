//! USB identity and webcam location policy.
//!
//! # Why "exactly one"?
//!
//! The webcam is found by vendor/product id.  Two identical devices on the bus
//! (a docked external camera of the same model, say) would make the match
//! ambiguous, and toggling the wrong device is worse than not toggling at all.
//! So [`select_webcam`] only resolves a location when the match is unique.

use std::fmt;

/// USB vendor/product pair, stored as lowercase hex text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsbIdentity {
    vendor_id: String,
    product_id: String,
}

impl UsbIdentity {
    /// Creates an identity, normalising both ids to trimmed lowercase.
    pub fn new(vendor_id: &str, product_id: &str) -> Self {
        Self {
            vendor_id: normalise(vendor_id),
            product_id: normalise(product_id),
        }
    }

    /// Parses the body of an `I:` listing line
    /// (`Bus=0003 Vendor=13d3 Product=56bb Version=2101`).
    ///
    /// Returns `None` if either `Vendor=` or `Product=` is missing or empty.
    pub fn from_identity_line(body: &str) -> Option<Self> {
        let mut vendor = None;
        let mut product = None;
        for token in body.split_whitespace() {
            match token.split_once('=') {
                Some(("Vendor", v)) if !v.is_empty() => vendor = Some(v),
                Some(("Product", p)) if !p.is_empty() => product = Some(p),
                _ => {}
            }
        }
        Some(Self::new(vendor?, product?))
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Compares against the content of a sysfs `idVendor` file.
    pub fn matches_vendor(&self, id_vendor: &str) -> bool {
        normalise(id_vendor) == self.vendor_id
    }

    /// Compares against the content of a sysfs `idProduct` file.
    pub fn matches_product(&self, id_product: &str) -> bool {
        normalise(id_product) == self.product_id
    }
}

impl fmt::Display for UsbIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor_id, self.product_id)
    }
}

fn normalise(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

/// Attributes read from one `/sys/bus/usb/devices/<id>` directory.
///
/// Interfaces and root hubs have no `idVendor`/`idProduct` files; those
/// fields are `None` and the entry never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceAttributes {
    /// Directory name, e.g. `1-5`.  This is the bus location id.
    pub bus_location_id: String,
    pub id_vendor: Option<String>,
    pub id_product: Option<String>,
}

/// Outcome of looking for a single device on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsbMatch<T> {
    /// Exactly one device matched.
    Unique(T),
    /// No device matched.
    NotFound,
    /// More than one device matched; the count is kept for the log line.
    Ambiguous(usize),
}

/// Picks the webcam's bus location out of the enumerated USB devices.
///
/// Devices are filtered by vendor first and then by product.  The result is
/// [`UsbMatch::Unique`] only when exactly one device survives both filters.
pub fn select_webcam(identity: &UsbIdentity, devices: &[UsbDeviceAttributes]) -> UsbMatch<String> {
    let by_vendor = devices.iter().filter(|d| {
        d.id_vendor
            .as_deref()
            .is_some_and(|v| identity.matches_vendor(v))
    });
    let mut matches: Vec<&UsbDeviceAttributes> = by_vendor
        .filter(|d| {
            d.id_product
                .as_deref()
                .is_some_and(|p| identity.matches_product(p))
        })
        .collect();

    match matches.len() {
        0 => UsbMatch::NotFound,
        1 => UsbMatch::Unique(matches.remove(0).bus_location_id.clone()),
        n => UsbMatch::Ambiguous(n),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
