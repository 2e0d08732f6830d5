use crate::infra::InMemoryCaseRepository;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use noticeworks::error::AppError;
use noticeworks::workflows::cases::{
    CaseId, CaseService, DecisionView, GateView, LedgerImportView,
};
use noticeworks::workflows::catalog::{embedded_identifiers, EmbeddedDefinitions};
use noticeworks::workflows::eligibility::RuleSetLoader;
use noticeworks::workflows::intake::{QuestionId, QuestionSetLoader};
use noticeworks::workflows::scope::{CaseType, Jurisdiction, Product};
use noticeworks::workflows::source::DefinitionError;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Planned notice service date (YYYY-MM-DD). Defaults to four weeks from today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) service_date: Option<NaiveDate>,
    /// Rent ledger CSV to import instead of answering the arrears questions by hand.
    #[arg(long)]
    pub(crate) ledger_csv: Option<PathBuf>,
    /// Print the exported fact snapshot alongside the bundle summary.
    #[arg(long)]
    pub(crate) include_facts: bool,
}

pub(crate) fn run_definitions_list() -> Result<(), AppError> {
    let source: Arc<dyn noticeworks::workflows::source::DefinitionSource> =
        Arc::new(EmbeddedDefinitions);
    let questions = QuestionSetLoader::new(Arc::clone(&source));
    let rules = RuleSetLoader::new(source);
    let mut first_failure: Option<DefinitionError> = None;

    println!("Embedded questionnaire sets");
    for jurisdiction in [
        Jurisdiction::England,
        Jurisdiction::Wales,
        Jurisdiction::Scotland,
    ] {
        match questions.load(Product::NoticeBuilder, jurisdiction) {
            Ok(set) => {
                let question_count: usize =
                    set.sections.iter().map(|s| s.questions.len()).sum();
                println!(
                    "- {} / {}: version {}, {} sections, {} questions",
                    Product::NoticeBuilder.label(),
                    jurisdiction.label(),
                    set.version,
                    set.sections.len(),
                    question_count
                );
            }
            Err(err) => {
                println!(
                    "- {} / {}: failed to load ({err})",
                    Product::NoticeBuilder.label(),
                    jurisdiction.label()
                );
                first_failure.get_or_insert(err);
            }
        }
    }

    println!("\nEmbedded rule sets");
    for jurisdiction in [
        Jurisdiction::England,
        Jurisdiction::Wales,
        Jurisdiction::Scotland,
        Jurisdiction::NorthernIreland,
    ] {
        match rules.load(jurisdiction, CaseType::Eviction) {
            Ok(set) => println!(
                "- {} / {}: version {}, {} rules, {} blocking checks, {} advisories",
                jurisdiction.label(),
                CaseType::Eviction.key(),
                set.version,
                set.rules.len(),
                set.blocking_checks.len(),
                set.advisories.len()
            ),
            Err(err) => {
                println!(
                    "- {} / {}: failed to load ({err})",
                    jurisdiction.label(),
                    CaseType::Eviction.key()
                );
                first_failure.get_or_insert(err);
            }
        }
    }

    println!(
        "\n{} embedded documents in total",
        embedded_identifiers().len()
    );

    // A defective document must fail the command, not just print.
    match first_failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        service_date,
        ledger_csv,
        include_facts,
    } = args;

    let service_date =
        service_date.unwrap_or_else(|| Local::now().date_naive() + Duration::days(28));

    println!("Possession notice demo: England rent arrears case");

    let repository = Arc::new(InMemoryCaseRepository::default());
    let service = Arc::new(CaseService::new(repository, Arc::new(EmbeddedDefinitions)));

    let status = service.open(
        Product::NoticeBuilder,
        Jurisdiction::England,
        CaseType::Eviction,
    )?;
    println!(
        "Opened case {} ({} / {})",
        status.case_id.0, status.product_label, status.jurisdiction_label
    );

    println!("\nTenancy and deposit");
    apply_answers(
        &service,
        &status.case_id,
        &[
            ("tenancy_type", json!("assured_shorthold")),
            ("tenancy_start", json!("2022-06-01")),
            ("fixed_term", json!(false)),
            ("rent_amount", json!(950)),
            ("rent_period", json!("monthly")),
            ("deposit_taken", json!(true)),
            ("deposit_protected", json!(true)),
            ("prescribed_info", json!(true)),
        ],
    )?;

    println!("\nArrears");
    match ledger_csv {
        Some(path) => {
            let csv_text = std::fs::read_to_string(&path)?;
            let imported = service.import_rent_ledger(&status.case_id, &csv_text)?;
            render_ledger_import(&path, &imported);
            let guidance = service.guidance(&status.case_id)?;
            render_decision("Guidance after the arrears ledger", &guidance);
        }
        None => {
            apply_answers(
                &service,
                &status.case_id,
                &[
                    ("has_arrears", json!(true)),
                    ("arrears_months", json!(4)),
                    ("arrears_amount", json!(3800)),
                    ("persistent_delay", json!(true)),
                ],
            )?;
        }
    }

    println!("\nConduct, compliance, and service details");
    apply_answers(
        &service,
        &status.case_id,
        &[
            ("antisocial", json!(false)),
            ("breach_of_tenancy", json!(false)),
            ("gas_safety", json!(true)),
            ("epc", json!(true)),
            ("how_to_rent", json!(true)),
            ("licensing_required", json!(false)),
            ("planned_service_date", json!(service_date.to_string())),
            ("service_method", json!("first_class_post")),
        ],
    )?;

    let next = service.next_step(&status.case_id)?;
    println!(
        "\nQuestionnaire progress: {}/{} answered ({}%)",
        next.progress.answered, next.progress.applicable, next.progress.percent
    );

    let guidance = service.guidance(&status.case_id)?;
    render_decision("Final guidance", &guidance);

    let primary = match &guidance.primary {
        Some(primary) => primary.clone(),
        None => {
            println!("\nNo route is recommended on these facts; nothing to export.");
            return Ok(());
        }
    };

    let status = match service.select_outcome(&status.case_id, &primary.rule_id) {
        Ok(status) => status,
        Err(err) => {
            println!("\nSelection unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "\nSelected {} ({})",
        primary.rule_id, primary.route_label
    );

    let gate = service.check_gate(&status.case_id)?;
    render_gate(&gate);
    if !gate.allowed {
        return Ok(());
    }

    let bundle = match service.export(&status.case_id) {
        Ok(bundle) => bundle,
        Err(err) => {
            println!("Export refused: {err}");
            return Ok(());
        }
    };

    println!("\nExport bundle");
    println!("- Form: {}", bundle.form_reference);
    println!(
        "- Notice period: {} days",
        bundle.outcome.notice_period_days
    );
    if let Some(timeline) = &bundle.timeline {
        println!("- Serve on: {}", timeline.service_date);
        println!(
            "- Earliest court proceedings: {}",
            timeline.earliest_proceedings
        );
        println!(
            "- Proceedings deadline: {}",
            timeline.proceedings_deadline
        );
    }
    if include_facts {
        match serde_json::to_string_pretty(&bundle.facts) {
            Ok(facts) => println!("- Fact snapshot:\n{facts}"),
            Err(err) => println!("- Fact snapshot unavailable: {err}"),
        }
    }

    Ok(())
}

fn apply_answers(
    service: &CaseService<InMemoryCaseRepository>,
    case_id: &CaseId,
    answers: &[(&str, Value)],
) -> Result<(), AppError> {
    for (question_id, value) in answers {
        let view = service.answer(case_id, &QuestionId::from(*question_id), value)?;
        if let Some(guidance) = view.guidance {
            render_decision("Interim guidance (checkpoint reached)", &guidance);
        }
    }
    println!("- answered {} questions", answers.len());
    Ok(())
}

fn render_ledger_import(path: &Path, imported: &LedgerImportView) {
    println!("- imported rent ledger from {}", path.display());
    println!(
        "- {} entries | arrears \u{a3}{:.2} ({:.2} months of rent)",
        imported.summary.entries,
        imported.summary.arrears_amount,
        imported.summary.months_equivalent
    );
    println!(
        "- {} unpaid periods, {} late payments{}",
        imported.summary.unpaid_periods,
        imported.summary.late_payments,
        if imported.summary.persistent_lateness {
            " (persistent lateness)"
        } else {
            ""
        }
    );
    println!("- answered {} arrears questions", imported.receipts.len());
}

fn render_decision(header: &str, decision: &DecisionView) {
    println!("\n{header}");

    if decision.recommended.is_empty() {
        println!("- No route is recommended yet");
    } else {
        println!("- Recommended routes:");
        for outcome in &decision.recommended {
            let grounds = if outcome.grounds.is_empty() {
                String::from("no grounds")
            } else {
                let codes: Vec<&str> =
                    outcome.grounds.iter().map(|g| g.code.as_str()).collect();
                format!("grounds {}", codes.join(", "))
            };
            println!(
                "  - {} via {} ({}): {}, {} days notice, {} likelihood",
                outcome.rule_id,
                outcome.route_label,
                outcome.form_reference,
                grounds,
                outcome.notice_period_days,
                outcome.success_likelihood_label
            );
        }
    }

    for issue in &decision.blocking_issues {
        let scope = match issue.blocks {
            Some(route) => route.label().to_string(),
            None => String::from("all routes"),
        };
        println!("- Blocking ({scope}): {}", issue.reason);
    }

    if !decision.missing_facts.is_empty() {
        let paths: Vec<String> = decision
            .missing_facts
            .iter()
            .map(|path| path.to_string())
            .collect();
        println!("- Facts still needed: {}", paths.join(", "));
    }

    for warning in &decision.warnings {
        println!("- Note: {warning}");
    }
}

fn render_gate(gate: &GateView) {
    if gate.allowed {
        println!("\nExport gate: clear");
    } else {
        println!("\nExport gate: blocked");
        for message in &gate.reason_messages {
            println!("- {message}");
        }
    }
}
