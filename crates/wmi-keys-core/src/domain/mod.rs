//! Domain layer: pure types and policies with no OS dependencies.
//!
//! - **`usb`** – [`UsbIdentity`](usb::UsbIdentity) and the exactly-one-match
//!   policy for locating the webcam on the USB bus.
//! - **`webcam`** – [`WebcamDevice`](webcam::WebcamDevice) power state and the
//!   reasons camera support can be unavailable.
//! - **`keys`** – Classification of raw WMI scan codes.

pub mod keys;
pub mod usb;
pub mod webcam;
