use super::ct363_packet::{MAX_POINTS, MAX_X, MAX_Y};

/// Absolute axes a sink registers for this controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsAxis {
    X,
    Y,
    MtPositionX,
    MtPositionY,
    MtTouchMajor,
    MtWidthMajor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisInfo {
    pub axis: AbsAxis,
    pub min: i32,
    pub max: i32,
}

impl AxisInfo {
    const fn new(axis: AbsAxis, max: u16) -> Self {
        Self {
            axis,
            min: 0,
            max: max as i32,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Static description of the controller as presented to an input stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: &'static str,
    pub i2c_id: &'static str,
    pub compatible: &'static str,
    pub slots: usize,
    /// Touch-major value reported with every contact; the controller has no real contact size.
    pub touch_major: u8,
    pub axes: [AxisInfo; 6],
}

impl DeviceInfo {
    pub fn axis(&self, axis: AbsAxis) -> Option<&AxisInfo> {
        self.axes.iter().find(|info| info.axis == axis)
    }
}

pub const DEVICE_INFO: DeviceInfo = DeviceInfo {
    name: "VTL ct363 Touch Screen",
    i2c_id: "ct363_ts",
    compatible: "vtl,ct363_ts",
    slots: MAX_POINTS,
    touch_major: 1,
    axes: [
        AxisInfo::new(AbsAxis::X, MAX_X),
        AxisInfo::new(AbsAxis::Y, MAX_Y),
        AxisInfo::new(AbsAxis::MtPositionX, MAX_X),
        AxisInfo::new(AbsAxis::MtPositionY, MAX_Y),
        AxisInfo::new(AbsAxis::MtTouchMajor, 255),
        AxisInfo::new(AbsAxis::MtWidthMajor, 255),
    ],
};
