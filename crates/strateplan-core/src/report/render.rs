//! Text, table, and JSON renderings of a [`PlanReport`]

use std::fmt::Write;

use super::{PlanReport, ReportFormat};
use crate::error::Result;
use crate::format::{self, TextTable};

const RULE_WIDTH: usize = 80;
const BAR_WIDTH: usize = 20;

/// Render a report in the requested format
pub fn render(report: &PlanReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Table => Ok(render_table(report)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn header(out: &mut String, report: &PlanReport) {
    let plan = &report.plan;
    let totals = &report.totals;
    let rule = "=".repeat(RULE_WIDTH);

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Plan report: {} (ID: {})", plan.name, plan.id);
    let _ = writeln!(out, "{}", rule);
    if let Some(description) = &plan.description {
        let _ = writeln!(out, "Description: {}", description);
    }
    let _ = writeln!(
        out,
        "Period: {}",
        format::date_range(plan.start_date, plan.end_date)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Issues: {}", totals.issue_count);
    let _ = writeln!(
        out,
        "KPIs: {} ({} achieved)",
        totals.kpi_count, totals.kpi_achieved
    );
    let _ = writeln!(out, "Initiatives: {}", totals.initiative_count);
    let _ = writeln!(out, "Total budget: {}", format::budget(totals.total_budget));
}

fn render_text(report: &PlanReport) -> String {
    let mut out = String::new();
    header(&mut out, report);

    if report.issues.is_empty() {
        let _ = writeln!(out, "\nNo issues in this plan.");
        return out;
    }

    for (position, entry) in report.issues.iter().enumerate() {
        let issue = &entry.issue;
        let priority = issue
            .priority
            .map_or_else(|| "unset".to_string(), |p| p.to_string());

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}. {} (ID: {}, priority: {})",
            position + 1,
            issue.name,
            issue.id,
            priority
        );
        if let Some(description) = &issue.description {
            let _ = writeln!(out, "   Description: {}", description);
        }

        let _ = writeln!(out, "   KPIs ({}):", entry.kpis.len());
        for kpi in &entry.kpis {
            let unit = kpi.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
            let _ = writeln!(
                out,
                "     - {}: {} / {}{} {}",
                kpi.name,
                format::number(kpi.current_value),
                format::number(kpi.target_value),
                unit,
                format::progress_bar(kpi.current_value, kpi.target_value, BAR_WIDTH)
            );
        }

        let _ = writeln!(out, "   Initiatives ({}):", entry.initiatives.len());
        for initiative in &entry.initiatives {
            let _ = writeln!(
                out,
                "     - {} [{}] budget {}, {}",
                initiative.name,
                initiative.status,
                format::optional_budget(initiative.budget),
                format::date_range(initiative.start_date, initiative.end_date)
            );
        }

        let _ = writeln!(out, "   Budget: {}", format::budget(entry.stats.budget));
    }
    out
}

fn render_table(report: &PlanReport) -> String {
    let mut out = String::new();
    header(&mut out, report);

    if report.issues.is_empty() {
        let _ = writeln!(out, "\nNo issues in this plan.");
        return out;
    }

    let mut issues = TextTable::new([
        "ID",
        "Priority",
        "Issue",
        "KPIs",
        "Achieved",
        "Initiatives",
        "Budget",
    ]);
    let mut kpis = TextTable::new(["ID", "Issue", "KPI", "Target", "Current", "Unit", "Progress"]);
    let mut initiatives =
        TextTable::new(["ID", "Issue", "Initiative", "Status", "Budget", "Period"]);

    for entry in &report.issues {
        let issue = &entry.issue;
        let stats = &entry.stats;
        issues.row([
            issue.id.to_string(),
            issue.priority.map_or_else(|| "-".to_string(), |p| p.to_string()),
            issue.name.clone(),
            stats.kpi_count.to_string(),
            stats.kpi_achieved.to_string(),
            stats.initiative_count.to_string(),
            if stats.budget > 0.0 {
                format::budget(stats.budget)
            } else {
                "-".to_string()
            },
        ]);

        for kpi in &entry.kpis {
            kpis.row([
                kpi.id.to_string(),
                issue.name.clone(),
                kpi.name.clone(),
                format::number(kpi.target_value),
                format::number(kpi.current_value),
                format::or_dash(kpi.unit.as_deref()),
                kpi.progress()
                    .map_or_else(|| "N/A".to_string(), |p| format!("{:.1}%", p)),
            ]);
        }

        for initiative in &entry.initiatives {
            initiatives.row([
                initiative.id.to_string(),
                issue.name.clone(),
                initiative.name.clone(),
                initiative.status.to_string(),
                format::optional_budget(initiative.budget),
                format::date_range(initiative.start_date, initiative.end_date),
            ]);
        }
    }

    for (title, table) in [
        ("Issues", &issues),
        ("KPIs", &kpis),
        ("Initiatives", &initiatives),
    ] {
        let _ = writeln!(out, "\n{}:", title);
        if table.is_empty() {
            let _ = writeln!(out, "  (none)");
        } else {
            let _ = writeln!(out, "{}", table.render());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::entities::test_support::create_test_db;
    use crate::entities::{
        InitiativeManager, IssueManager, KpiManager, NewInitiative, NewIssue, NewKpi, NewPlan,
        PlanManager,
    };
    use crate::report::{ReportAggregator, ReportFormat};
    use crate::storage::Database;

    fn seed(db: &Database) -> i64 {
        let plan = PlanManager::new(db)
            .create(NewPlan {
                name: "Growth".into(),
                description: Some("Three year plan".into()),
                ..Default::default()
            })
            .unwrap();
        let issues = IssueManager::new(db);
        let low = issues
            .create(NewIssue {
                plan_id: plan.id,
                name: "Low priority".into(),
                priority: Some(2),
                ..Default::default()
            })
            .unwrap();
        let high = issues
            .create(NewIssue {
                plan_id: plan.id,
                name: "High priority".into(),
                priority: Some(1),
                ..Default::default()
            })
            .unwrap();
        KpiManager::new(db)
            .create(NewKpi {
                issue_id: high.id,
                name: "Satisfaction".into(),
                target_value: Some(90.0),
                current_value: Some(75.0),
                unit: Some("%".into()),
                ..Default::default()
            })
            .unwrap();
        InitiativeManager::new(db)
            .create(NewInitiative {
                issue_id: low.id,
                name: "Survey".into(),
                budget: Some(1200.0),
                ..Default::default()
            })
            .unwrap();
        plan.id
    }

    #[test]
    fn test_text_lists_issues_in_priority_order() {
        let (db, _temp) = create_test_db();
        let plan_id = seed(&db);
        let report = ReportAggregator::new(&db).plan_summary(plan_id).unwrap();

        let text = render(&report, ReportFormat::Text).unwrap();
        let high = text.find("1. High priority").expect("high priority issue listed");
        let low = text.find("2. Low priority").expect("low priority issue listed");
        assert!(high < low);
        assert!(text.contains("Plan report: Growth"));
        assert!(text.contains("Description: Three year plan"));
        assert!(text.contains("Satisfaction: 75 / 90 %"));
        assert!(text.contains("Survey [planned] budget 1,200.00"));
        assert!(text.contains("Total budget: 1,200.00"));
    }

    #[test]
    fn test_table_has_a_section_per_entity_type() {
        let (db, _temp) = create_test_db();
        let plan_id = seed(&db);
        let report = ReportAggregator::new(&db).plan_summary(plan_id).unwrap();

        let table = render(&report, ReportFormat::Table).unwrap();
        for section in ["\nIssues:\n", "\nKPIs:\n", "\nInitiatives:\n"] {
            assert!(table.contains(section), "missing section {:?}", section);
        }
        assert!(table.contains("83.3%"));
        assert!(table.contains("| Survey "));
    }

    #[test]
    fn test_json_is_nested() {
        let (db, _temp) = create_test_db();
        let plan_id = seed(&db);
        let report = ReportAggregator::new(&db).plan_summary(plan_id).unwrap();

        let json = render(&report, ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["plan"]["name"], "Growth");
        assert_eq!(value["issues"][0]["issue"]["name"], "High priority");
        assert_eq!(value["issues"][0]["kpis"][0]["target_value"], 90.0);
        assert_eq!(value["issues"][1]["initiatives"][0]["status"], "planned");
        assert_eq!(value["totals"]["issue_count"], 2);
    }

    #[test]
    fn test_text_shows_progress_past_target() {
        let (db, _temp) = create_test_db();
        let plan = PlanManager::new(&db)
            .create(NewPlan {
                name: "Ahead".into(),
                ..Default::default()
            })
            .unwrap();
        let issue = IssueManager::new(&db)
            .create(NewIssue {
                plan_id: plan.id,
                name: "Revenue".into(),
                ..Default::default()
            })
            .unwrap();
        KpiManager::new(&db)
            .create(NewKpi {
                issue_id: issue.id,
                name: "Sales".into(),
                target_value: Some(100.0),
                current_value: Some(150.0),
                ..Default::default()
            })
            .unwrap();
        let report = ReportAggregator::new(&db).plan_summary(plan.id).unwrap();

        let text = render(&report, ReportFormat::Text).unwrap();
        assert!(text.contains("] 150.0%"), "{}", text);
        let table = render(&report, ReportFormat::Table).unwrap();
        assert!(table.contains("150.0%"));
    }

    #[test]
    fn test_empty_plan_says_so() {
        let (db, _temp) = create_test_db();
        let plan = PlanManager::new(&db)
            .create(NewPlan {
                name: "Empty".into(),
                ..Default::default()
            })
            .unwrap();
        let report = ReportAggregator::new(&db).plan_summary(plan.id).unwrap();

        for format in [ReportFormat::Text, ReportFormat::Table] {
            let rendered = render(&report, format).unwrap();
            assert!(rendered.contains("No issues in this plan."));
            assert!(rendered.contains("Period: unspecified"));
        }
    }
}
