use crate::infra::{build_services, PortalServices};
use chrono::Utc;
use clap::Args;
use job_portal::config::{
    AlertConfig, AppConfig, AppEnvironment, AuthConfig, ServerConfig, TelemetryConfig,
};
use job_portal::error::AppError;
use job_portal::telemetry;
use job_portal::workflows::accounts::{
    NotificationPreferences, User, UserId, UserRepository, UserRole,
};
use job_portal::workflows::alerts::{DispatchReport, LogNotifier};
use job_portal::workflows::listings::service::sample_drafts;
use job_portal::workflows::listings::{EducationLevel, Job, JobCategory, JobRepository};
use std::collections::BTreeSet;
use std::sync::Arc;

const DEMO_EDUCATION: [EducationLevel; 3] = [
    EducationLevel::Graduate,
    EducationLevel::Iti,
    EducationLevel::Class12,
];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of sample members to register before the jobs are published.
    #[arg(long, default_value_t = 24)]
    pub(crate) members: usize,
    /// Concurrent alert workers.
    #[arg(long, default_value_t = 4)]
    pub(crate) concurrency: usize,
    /// Soft cap on alerted members per job (0 disables the cap).
    #[arg(long, default_value_t = 1000)]
    pub(crate) cap: usize,
    /// Print the full dispatch report for each job as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = demo_config(&args);
    telemetry::init(&config.telemetry)?;

    let services = build_services(&config, Arc::new(LogNotifier));
    let members = seed_members(&services, args.members);
    let jobs = seed_jobs(&services);

    println!("Job alert demo");
    println!(
        "  Members: {} registered, {} with e-mail alerts on",
        args.members, members
    );
    println!(
        "  Dispatch: {} workers, cap {}",
        args.concurrency,
        config
            .alerts
            .candidate_cap
            .map_or_else(|| "disabled".to_string(), |cap| cap.to_string())
    );

    for job in &jobs {
        println!("\n{} ({})", job.title, job.category.label());
        match services.pipeline.run(job).await {
            Ok(report) => render_report(&report, args.json),
            Err(err) => println!("  Alerts unavailable: {}", err),
        }
    }

    if let Some(job) = jobs.first() {
        println!("\nRe-running alerts for '{}'", job.title);
        match services.pipeline.run(job).await {
            Ok(report) => println!(
                "  Sent {}, skipped {} already alerted",
                report.succeeded.len(),
                report.skipped.len()
            ),
            Err(err) => println!("  Alerts unavailable: {}", err),
        }
    }

    Ok(())
}

fn demo_config(args: &DemoArgs) -> AppConfig {
    AppConfig {
        environment: AppEnvironment::Development,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        telemetry: TelemetryConfig {
            log_level: "warn".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "demo-secret".to_string(),
            token_ttl_minutes: 60,
            admin: None,
        },
        alerts: AlertConfig {
            concurrency: args.concurrency.max(1),
            candidate_cap: (args.cap > 0).then_some(args.cap),
            ..AlertConfig::default()
        },
        email: None,
    }
}

/// Registers `count` members with rotating interests. Every fifth member has alerts muted and
/// every fourth leaves categories empty.
fn seed_members(services: &PortalServices, count: usize) -> usize {
    let now = Utc::now();
    let mut alerting = 0;
    for index in 0..count {
        let categories: BTreeSet<JobCategory> = if index % 4 == 0 {
            BTreeSet::new()
        } else {
            BTreeSet::from([JobCategory::ALL[index % JobCategory::ALL.len()]])
        };
        let email_alerts = index % 5 != 4;
        let member = User {
            id: UserId(format!("member-{index:03}")),
            email: format!("member{index}@example.in"),
            full_name: format!("Member {index}"),
            phone: None,
            location: None,
            preferred_job_categories: categories,
            education_level: Some(DEMO_EDUCATION[index % DEMO_EDUCATION.len()]),
            role: UserRole::User,
            is_active: true,
            email_verified: true,
            created_at: now,
            last_login: None,
            notification_preferences: NotificationPreferences {
                email_alerts,
                ..NotificationPreferences::default()
            },
            password_hash: String::new(),
        };
        match UserRepository::insert(services.store.as_ref(), member) {
            Ok(_) if email_alerts => alerting += 1,
            Ok(_) => {}
            Err(err) => println!("  Member {} not stored: {}", index, err),
        }
    }
    alerting
}

fn seed_jobs(services: &PortalServices) -> Vec<Job> {
    let now = Utc::now();
    let publisher = UserId("demo-admin".to_string());
    sample_drafts(now)
        .into_iter()
        .filter_map(|draft| {
            let job = Job::from_draft(draft, publisher.clone(), now);
            match JobRepository::insert(services.store.as_ref(), job) {
                Ok(job) => Some(job),
                Err(err) => {
                    println!("  Job not stored: {}", err);
                    None
                }
            }
        })
        .collect()
}

fn render_report(report: &DispatchReport, json: bool) {
    println!(
        "  Sent {}, skipped {}, failed {}{}",
        report.succeeded.len(),
        report.skipped.len(),
        report.failed.len(),
        if report.truncated {
            " (candidate cap reached)"
        } else {
            ""
        }
    );
    for failure in &report.failed {
        println!("    {} -> {}", failure.user_id, failure.error);
    }
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(payload) => println!("{}", payload),
            Err(err) => println!("  Report payload unavailable: {}", err),
        }
    }
}
