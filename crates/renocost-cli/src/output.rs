//! Output formatting module

use serde::Serialize;

use renocost_app::app::{EstimateOutcome, HistorySummary};
use renocost_types::{
    AmcStatus, AmcSubscription, OutputFormat, Provider, Quote, Result, ServiceType, SiteVisit,
    WorkLog,
};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

pub fn output_estimate(output_format: OutputFormat, outcome: &EstimateOutcome) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(outcome);
    }

    let quote = &outcome.quote;
    let estimate = &outcome.estimate;

    println!("\nEstimate");
    println!("========");
    println!("Quote ID:        {}", quote.id);
    println!("Service:         {}", quote.service_type.label());
    println!("Estimated cost:  ₹{:.2}", quote.estimated_cost);
    println!("Priced by:       {}", quote.confidence_source);

    println!("\n--- Heuristic breakdown ---");
    println!("Material:        ₹{:.2}", estimate.breakdown.material);
    println!("Labour:          ₹{:.2}", estimate.breakdown.labour);
    println!("Total:           ₹{:.2}", estimate.breakdown.total);
    println!("---------------------------");

    if !quote.input_features.is_empty() {
        println!("\nInputs:");
        for (key, value) in quote.input_features.iter() {
            println!("  {:<16} {}", key, value);
        }
    }
    if !quote.photo_refs.is_empty() {
        println!("\nPhotos:");
        for photo in &quote.photo_refs {
            println!("  {}", photo);
        }
    }

    println!("\n{}", estimate.purchase_suggestion);
    Ok(())
}

pub fn output_visit(output_format: OutputFormat, visit: &SiteVisit) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(visit);
    }

    println!("Site visit {} booked", visit.id);
    println!("Address:   {}", visit.address);
    println!("When:      {}", visit.scheduled_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Status:    {}", visit.status);
    if let Some(ref quote) = visit.linked_quote_id {
        println!("Quote:     {}", quote);
    }
    if let Some(ref customer) = visit.customer {
        println!("Customer:  {}", customer);
    }
    Ok(())
}

pub fn output_subscription(output_format: OutputFormat, subscription: &AmcSubscription) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(subscription);
    }

    println!("AMC subscription {} started", subscription.id);
    println!(
        "Plan:      {} (₹{:.0})",
        subscription.plan,
        subscription.plan.price()
    );
    println!("Start:     {}", subscription.start_date.format("%Y-%m-%d"));
    println!("Status:    {}", subscription.status);
    Ok(())
}

pub fn output_work_log(output_format: OutputFormat, log: &WorkLog) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(log);
    }

    println!("Work log {} saved for {}", log.id, log.worker);
    Ok(())
}

pub fn output_summary(summary: &HistorySummary) {
    println!(
        "Stored: {} quotes, {} site visits, {} AMC subscriptions, {} work logs",
        summary.quotes, summary.site_visits, summary.amc_subscriptions, summary.work_logs
    );
    println!();
}

pub fn output_quotes(output_format: OutputFormat, quotes: &[Quote]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(quotes);
    }
    if quotes.is_empty() {
        println!("No quotes found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<10} {:>9} {:>12} {:<9} {:>16}",
        "Quote ID", "Service", "Area(m²)", "Cost(₹)", "Source", "Date"
    );
    println!("{}", "-".repeat(97));
    for quote in quotes {
        println!(
            "{:<36} {:<10} {:>9.1} {:>12.2} {:<9} {:>16}",
            quote.id,
            quote.service_type.as_str(),
            quote.input_features.area(),
            quote.estimated_cost,
            quote.confidence_source.as_str(),
            quote.created_at.format("%Y-%m-%d %H:%M").to_string()
        );
    }
    Ok(())
}

pub fn output_visits(output_format: OutputFormat, visits: &[SiteVisit]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(visits);
    }
    if visits.is_empty() {
        println!("No site visits found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<30} {:>16} {:<10}",
        "Visit ID", "Address", "When", "Status"
    );
    println!("{}", "-".repeat(95));
    for visit in visits {
        println!(
            "{:<36} {:<30} {:>16} {:<10}",
            visit.id,
            truncate(&visit.address, 30),
            visit.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
            visit.status.as_str()
        );
    }
    Ok(())
}

/// Subscriptions with their status as of now
pub fn output_subscriptions(
    output_format: OutputFormat,
    subscriptions: &[(AmcSubscription, AmcStatus)],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let rows: Vec<_> = subscriptions
            .iter()
            .map(|(sub, status)| {
                let mut sub = sub.clone();
                sub.status = *status;
                sub
            })
            .collect();
        return print_json(&rows);
    }
    if subscriptions.is_empty() {
        println!("No AMC subscriptions found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<8} {:>10} {:<10} {:<20}",
        "Subscription ID", "Plan", "Start", "Status", "Customer"
    );
    println!("{}", "-".repeat(88));
    for (sub, status) in subscriptions {
        println!(
            "{:<36} {:<8} {:>10} {:<10} {:<20}",
            sub.id,
            sub.plan.as_str(),
            sub.start_date.format("%Y-%m-%d").to_string(),
            status.as_str(),
            truncate(sub.customer.as_deref().unwrap_or("-"), 20)
        );
    }
    Ok(())
}

pub fn output_work_logs(output_format: OutputFormat, logs: &[WorkLog]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(logs);
    }
    if logs.is_empty() {
        println!("No work logs found.");
        return Ok(());
    }

    for log in logs {
        println!("{} - {}", log.created_at.format("%Y-%m-%d %H:%M"), log.worker);
        if !log.completed.is_empty() {
            println!("  Done: {}", log.completed);
        }
        if !log.next_day.is_empty() {
            println!("  Next: {}", log.next_day);
        }
        if let Some(ref photo) = log.photo_ref {
            println!("  Photo: {}", photo);
        }
    }
    Ok(())
}

pub fn output_providers(output_format: OutputFormat, providers: &[Provider]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(providers);
    }
    if providers.is_empty() {
        println!("No providers found.");
        return Ok(());
    }

    println!(
        "{:<4} {:<24} {:<20} {:>6} {:<12} {:>10}",
        "ID", "Name", "Services", "Rating", "Phone", "Avg(₹)"
    );
    println!("{}", "-".repeat(82));
    for provider in providers {
        let services: Vec<&str> = provider.services.iter().map(ServiceType::as_str).collect();
        println!(
            "{:<4} {:<24} {:<20} {:>6.1} {:<12} {:>10}",
            provider.id,
            truncate(&provider.name, 24),
            truncate(&services.join(","), 20),
            provider.rating,
            provider.phone,
            provider
                .avg_charge
                .map(|c| format!("{:.0}", c))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}
