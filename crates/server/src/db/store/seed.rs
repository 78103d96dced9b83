use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::entities::computer_group::{
    AssociatedMonitorConfig, AssociatedProcedureConfig, IntervalUnit, MonitorIntervalUnit,
    ScheduleConfig,
};
use crate::db::entities::procedure::{
    ProcedureKind, ScriptType, SoftwareUpdateMode, WindowsUpdateScope,
};
use crate::db::entities::{
    computer, computer_group, license, monitor, monitor_execution_log, procedure,
    procedure_execution, system_license,
};
use crate::db::enums::{ComputerStatus, ProcedureExecutionStatus, SystemLicenseStatus};
use crate::db::store::{procedure_service, StoreInner};

fn seed_computer(
    inner: &mut StoreInner,
    name: &str,
    status: ComputerStatus,
    os: &str,
    ip: &str,
) -> i32 {
    let now = Utc::now();
    let id = inner.alloc_id();
    inner.computers.insert(
        id,
        computer::Model {
            id,
            name: name.to_string(),
            status,
            os: os.to_string(),
            ip_address: ip.to_string(),
            last_seen: match status {
                ComputerStatus::Online => now,
                _ => now - Duration::hours(18),
            },
            cpu_usage: None,
            ram_usage: None,
            disk_usage: None,
            group_ids: Vec::new(),
            created_at: now - Duration::days(30),
            updated_at: now - Duration::days(1),
        },
    );
    id
}

fn seed_procedure(
    inner: &mut StoreInner,
    name: &str,
    description: &str,
    kind: ProcedureKind,
) -> i32 {
    let now = Utc::now();
    let (script_type, script_content, run_as_user) = procedure_service::compile_script(&kind);
    let id = inner.alloc_id();
    inner.procedures.insert(
        id,
        procedure::Model {
            id,
            name: name.to_string(),
            description: Some(description.to_string()),
            kind,
            script_type,
            script_content,
            run_as_user,
            created_at: now - Duration::days(14),
            updated_at: now - Duration::days(2),
        },
    );
    id
}

/// Demo fleet loaded at startup when `seed_demo_data` is enabled. Stands in
/// for a real inventory import; every record here goes through the same
/// shapes the services produce.
pub fn seed_demo_data(inner: &mut StoreInner) {
    let now = Utc::now();

    let dc01 = seed_computer(
        inner,
        "DC-01",
        ComputerStatus::Online,
        "Windows Server 2022",
        "10.10.0.10",
    );
    let ws01 = seed_computer(
        inner,
        "WS-ACCOUNTING-01",
        ComputerStatus::Online,
        "Windows 11 Pro",
        "10.10.1.21",
    );
    let ws02 = seed_computer(
        inner,
        "WS-ACCOUNTING-02",
        ComputerStatus::Offline,
        "Windows 10 Pro",
        "10.10.1.22",
    );
    let ws03 = seed_computer(
        inner,
        "WS-DESIGN-01",
        ComputerStatus::Online,
        "Windows 11 Pro",
        "10.10.2.31",
    );
    let kiosk = seed_computer(
        inner,
        "KIOSK-LOBBY",
        ComputerStatus::Error,
        "Windows 10 IoT",
        "10.10.3.5",
    );

    let patch = seed_procedure(
        inner,
        "Monthly Windows patching",
        "Security and driver updates for the whole fleet",
        ProcedureKind::WindowsUpdate {
            scope: WindowsUpdateScope {
                security_updates: true,
                feature_updates: false,
                driver_updates: true,
            },
        },
    );
    let browsers = seed_procedure(
        inner,
        "Update browsers",
        "Keeps the standard browsers current",
        ProcedureKind::SoftwareUpdate {
            mode: SoftwareUpdateMode::Specific,
            specific_software: "Mozilla.Firefox, Google.Chrome".to_string(),
        },
    );
    let temp_cleanup = seed_procedure(
        inner,
        "Clear temp files",
        "Frees disk space on workstations",
        ProcedureKind::CustomScript {
            script_type: ScriptType::PowerShell,
            script_content: "Remove-Item -Path $env:TEMP\\* -Recurse -Force -ErrorAction SilentlyContinue\n".to_string(),
            run_as_user: true,
        },
    );

    let disk_monitor = {
        let id = inner.alloc_id();
        inner.monitors.insert(
            id,
            monitor::Model {
                id,
                name: "Low disk space".to_string(),
                description: Some("Alerts when C: drops under 10% free".to_string()),
                script_type: ScriptType::PowerShell,
                script_content:
                    "Get-PSDrive C | ForEach-Object { $_.Free / ($_.Used + $_.Free) }\n".to_string(),
                default_interval_value: 30,
                default_interval_unit: MonitorIntervalUnit::Minutes,
                send_email_on_alert: true,
                created_at: now - Duration::days(20),
                updated_at: now - Duration::days(20),
            },
        );
        id
    };
    let service_monitor = {
        let id = inner.alloc_id();
        inner.monitors.insert(
            id,
            monitor::Model {
                id,
                name: "Print spooler running".to_string(),
                description: None,
                script_type: ScriptType::PowerShell,
                script_content: "(Get-Service Spooler).Status -eq 'Running'\n".to_string(),
                default_interval_value: 1,
                default_interval_unit: MonitorIntervalUnit::Hours,
                send_email_on_alert: false,
                created_at: now - Duration::days(9),
                updated_at: now - Duration::days(9),
            },
        );
        id
    };

    // Groups, with the membership back-references written the same way the
    // group service writes them.
    let accounting = {
        let id = inner.alloc_id();
        inner.groups.insert(
            id,
            computer_group::Model {
                id,
                name: "Accounting".to_string(),
                description: Some("Finance department workstations".to_string()),
                computer_ids: vec![ws01, ws02],
                associated_procedures: vec![
                    AssociatedProcedureConfig {
                        procedure_id: patch,
                        run_on_new_member: false,
                        schedule: ScheduleConfig::Monthly {
                            time: "03:00".to_string(),
                            day_of_month: 12,
                        },
                    },
                    AssociatedProcedureConfig {
                        procedure_id: temp_cleanup,
                        run_on_new_member: true,
                        schedule: ScheduleConfig::Weekly {
                            time: "18:30".to_string(),
                            day_of_week: 5,
                        },
                    },
                ],
                associated_monitors: vec![AssociatedMonitorConfig {
                    monitor_id: disk_monitor,
                    interval_value: 15,
                    interval_unit: MonitorIntervalUnit::Minutes,
                }],
                created_at: now - Duration::days(25),
                updated_at: now - Duration::days(3),
            },
        );
        id
    };
    let all_workstations = {
        let id = inner.alloc_id();
        inner.groups.insert(
            id,
            computer_group::Model {
                id,
                name: "All workstations".to_string(),
                description: None,
                computer_ids: vec![ws01, ws02, ws03, kiosk],
                associated_procedures: vec![AssociatedProcedureConfig {
                    procedure_id: browsers,
                    run_on_new_member: true,
                    schedule: ScheduleConfig::CustomInterval {
                        interval_value: 12,
                        interval_unit: IntervalUnit::Hours,
                    },
                }],
                associated_monitors: vec![AssociatedMonitorConfig {
                    monitor_id: service_monitor,
                    interval_value: 2,
                    interval_unit: MonitorIntervalUnit::Hours,
                }],
                created_at: now - Duration::days(25),
                updated_at: now - Duration::days(25),
            },
        );
        id
    };
    for (cid, gids) in [
        (ws01, vec![accounting, all_workstations]),
        (ws02, vec![accounting, all_workstations]),
        (ws03, vec![all_workstations]),
        (kiosk, vec![all_workstations]),
    ] {
        if let Some(c) = inner.computers.get_mut(&cid) {
            c.group_ids = gids;
        }
    }

    // A slice of execution history, all terminal.
    for (pid, cid, cname, status, output, hours_ago) in [
        (
            patch,
            dc01,
            "DC-01",
            ProcedureExecutionStatus::Success,
            "Script completed successfully with exit code 0.",
            70,
        ),
        (
            temp_cleanup,
            ws01,
            "WS-ACCOUNTING-01",
            ProcedureExecutionStatus::Success,
            "Script completed successfully with exit code 0.",
            26,
        ),
        (
            browsers,
            ws03,
            "WS-DESIGN-01",
            ProcedureExecutionStatus::Failed,
            "Script exited with a non-zero exit code.",
            5,
        ),
    ] {
        let start = now - Duration::hours(hours_ago);
        let run_as_user = inner
            .procedures
            .get(&pid)
            .map(|p| p.run_as_user)
            .unwrap_or(false);
        let id = Uuid::new_v4();
        inner.executions.insert(
            id,
            procedure_execution::Model {
                id,
                procedure_id: pid,
                computer_id: cid,
                computer_name: cname.to_string(),
                status,
                start_time: start,
                end_time: Some(start + Duration::seconds(3)),
                logs: format!("Queued for execution on {cname}\n{output}\n"),
                output: output.to_string(),
                run_as_user,
            },
        );
    }

    // Monitor history exists as seed only; no executor produces it.
    for (mid, cid, cname, is_alert, output, hours_ago) in [
        (disk_monitor, ws01, "WS-ACCOUNTING-01", false, "21% free", 4),
        (disk_monitor, ws02, "WS-ACCOUNTING-02", true, "7% free", 30),
        (service_monitor, ws03, "WS-DESIGN-01", false, "Running", 2),
    ] {
        let id = Uuid::new_v4();
        inner.monitor_logs.insert(
            id,
            monitor_execution_log::Model {
                id,
                monitor_id: mid,
                computer_id: cid,
                computer_name: cname.to_string(),
                executed_at: now - Duration::hours(hours_ago),
                is_alert,
                output: output.to_string(),
            },
        );
    }

    for (software, vendor, key, seats) in [
        ("Microsoft 365 Business", "Microsoft", "M365B-4K2XP-99RTY-QWE12-ZXCV3", 25),
        ("Adobe Creative Cloud", "Adobe", "ACC01-77421-PLMKO-IJNUH-YGVB2", 5),
    ] {
        let id = inner.alloc_id();
        inner.licenses.insert(
            id,
            license::Model {
                id,
                software_name: software.to_string(),
                vendor: vendor.to_string(),
                license_key: key.to_string(),
                seats,
                expires_at: Some(now + Duration::days(200)),
                notes: None,
                created_at: now - Duration::days(60),
                updated_at: now - Duration::days(60),
            },
        );
    }

    // Demo installs boot licensed so mutating routes work out of the box.
    inner.system_license = system_license::Model {
        status: SystemLicenseStatus::Valid,
        license_key: Some("FGRID-DEMO1-DEMO2-DEMO3-DEMO4".to_string()),
        max_computers: 100,
        activated_at: Some(now - Duration::days(10)),
        expires_at: Some(now + Duration::days(355)),
    };
}
