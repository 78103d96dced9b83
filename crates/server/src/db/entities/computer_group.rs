use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Minutes,
    Hours,
}

/// Schedule attached to a procedure association. Pure configuration at rest:
/// nothing in this codebase evaluates it against wall-clock time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScheduleConfig {
    Disabled,
    #[serde(rename_all = "camelCase")]
    RunOnce { time: String },
    #[serde(rename_all = "camelCase")]
    Daily { time: String },
    #[serde(rename_all = "camelCase")]
    Weekly { time: String, day_of_week: u8 },
    #[serde(rename_all = "camelCase")]
    Monthly { time: String, day_of_month: u8 },
    #[serde(rename_all = "camelCase")]
    CustomInterval {
        interval_value: u32,
        interval_unit: IntervalUnit,
    },
}

impl ScheduleConfig {
    /// Checks the conditionally-required fields of each variant.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ScheduleConfig::Disabled => Ok(()),
            ScheduleConfig::RunOnce { time } | ScheduleConfig::Daily { time } => {
                validate_time(time)
            }
            ScheduleConfig::Weekly { time, day_of_week } => {
                validate_time(time)?;
                if *day_of_week > 6 {
                    return Err(format!("dayOfWeek must be 0-6, got {day_of_week}"));
                }
                Ok(())
            }
            ScheduleConfig::Monthly { time, day_of_month } => {
                validate_time(time)?;
                if !(1..=31).contains(day_of_month) {
                    return Err(format!("dayOfMonth must be 1-31, got {day_of_month}"));
                }
                Ok(())
            }
            ScheduleConfig::CustomInterval { interval_value, .. } => {
                if *interval_value < 1 {
                    return Err("intervalValue must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }
}

fn validate_time(time: &str) -> Result<(), String> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| format!("time must be HH:MM, got '{time}'"))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedProcedureConfig {
    pub procedure_id: i32,
    pub run_on_new_member: bool,
    pub schedule: ScheduleConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorIntervalUnit {
    Minutes,
    Hours,
    Days,
}

/// Per-group override of a monitor's default cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedMonitorConfig {
    pub monitor_id: i32,
    pub interval_value: u32,
    pub interval_unit: MonitorIntervalUnit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Set semantics, stored ordered. Order is user-reorderable and
    /// significant for display and execution.
    pub computer_ids: Vec<i32>,
    pub associated_procedures: Vec<AssociatedProcedureConfig>,
    pub associated_monitors: Vec<AssociatedMonitorConfig>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_schedule_is_always_valid() {
        assert!(ScheduleConfig::Disabled.validate().is_ok());
    }

    #[test]
    fn daily_schedule_requires_well_formed_time() {
        let ok = ScheduleConfig::Daily {
            time: "08:30".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = ScheduleConfig::Daily {
            time: "25:99".to_string(),
        };
        assert!(bad.validate().is_err());

        let not_a_time = ScheduleConfig::RunOnce {
            time: "noonish".to_string(),
        };
        assert!(not_a_time.validate().is_err());
    }

    #[test]
    fn weekly_schedule_checks_day_of_week_range() {
        let ok = ScheduleConfig::Weekly {
            time: "12:00".to_string(),
            day_of_week: 6,
        };
        assert!(ok.validate().is_ok());

        let bad = ScheduleConfig::Weekly {
            time: "12:00".to_string(),
            day_of_week: 7,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn monthly_schedule_checks_day_of_month_range() {
        let ok = ScheduleConfig::Monthly {
            time: "03:15".to_string(),
            day_of_month: 31,
        };
        assert!(ok.validate().is_ok());

        let bad = ScheduleConfig::Monthly {
            time: "03:15".to_string(),
            day_of_month: 0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn custom_interval_requires_positive_value() {
        let ok = ScheduleConfig::CustomInterval {
            interval_value: 15,
            interval_unit: IntervalUnit::Minutes,
        };
        assert!(ok.validate().is_ok());

        let bad = ScheduleConfig::CustomInterval {
            interval_value: 0,
            interval_unit: IntervalUnit::Hours,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn schedule_round_trips_through_tagged_json() {
        let schedule = ScheduleConfig::Weekly {
            time: "22:00".to_string(),
            day_of_week: 3,
        };
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["type"], "weekly");
        assert_eq!(json["dayOfWeek"], 3);
        let back: ScheduleConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);
    }
}
