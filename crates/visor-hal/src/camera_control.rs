//! Generic `CameraControl` trait for sensor tuning registers.

use visor_types::{BrightnessLevel, ContrastLevel, LightMode, Orientation, TestPattern};

/// Write-side tuning interface of the image sensor.
///
/// The console forwards operator tuning commands through this trait
/// fire-and-forget: the writes carry no return value and take effect on a
/// later frame, whenever the sensor applies them.
pub trait CameraControl {
    fn set_contrast(&mut self, level: ContrastLevel);

    fn set_brightness(&mut self, level: BrightnessLevel);

    fn set_orientation(&mut self, orientation: Orientation);

    fn set_light_mode(&mut self, mode: LightMode);

    fn set_test_pattern(&mut self, pattern: TestPattern);
}
