//! Physical range table for sensor and operating fields.
//!
//! Ranges are closed: a value equal to either bound is accepted.

/// Which family a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    Velocity,
    Acceleration,
    Temperature,
    Operational,
}

/// Accepted range for one or more field names
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRule {
    pub category: FieldCategory,
    pub fields: &'static [&'static str],
    pub min: f64,
    pub max: f64,
    pub message: &'static str,
}

impl RangeRule {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn applies_to(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

pub const RANGE_RULES: &[RangeRule] = &[
    RangeRule {
        category: FieldCategory::Velocity,
        fields: &["velV", "velH", "velAxl", "velocityV", "velocityH", "velocityA", "velocity"],
        min: 0.0,
        max: 100.0,
        message: "Velocity must be between 0-100 mm/s",
    },
    RangeRule {
        category: FieldCategory::Acceleration,
        fields: &[
            "accV",
            "accH",
            "accAxl",
            "accelerationV",
            "accelerationH",
            "accelerationA",
            "acceleration",
        ],
        min: 0.0,
        max: 1000.0,
        message: "Acceleration must be between 0-1000 m/s²",
    },
    RangeRule {
        category: FieldCategory::Temperature,
        fields: &["temp", "temperature"],
        min: -50.0,
        max: 200.0,
        message: "Temperature must be between -50-200 °C",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["operatingHours"],
        min: 0.0,
        max: 100_000.0,
        message: "Operating hours must be between 0-100000 h",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["operatingPower"],
        min: 0.0,
        max: 10_000.0,
        message: "Operating power must be between 0-10000 kW",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["operatingSpeed"],
        min: 0.0,
        max: 10_000.0,
        message: "Operating speed must be between 0-10000 RPM",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["operatingTemperature"],
        min: -50.0,
        max: 200.0,
        message: "Operating temperature must be between -50-200 °C",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["operatingPressure"],
        min: 0.0,
        max: 1000.0,
        message: "Operating pressure must be between 0-1000 bar",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["operatingFlow"],
        min: 0.0,
        max: 10_000.0,
        message: "Operating flow must be between 0-10000 m³/h",
    },
    RangeRule {
        category: FieldCategory::Operational,
        fields: &["efficiency"],
        min: 0.0,
        max: 100.0,
        message: "Efficiency must be between 0-100%",
    },
];

/// Look up the rule governing a field name.
pub fn rule_for(field: &str) -> Option<&'static RangeRule> {
    RANGE_RULES.iter().find(|rule| rule.applies_to(field))
}
