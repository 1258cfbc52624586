use itinerary_planner::{
    auth,
    booking,
    i18n::Translations,
    models::{
        AccommodationSuggestion, Activity, ItineraryDay, ItineraryPlan, Language, SessionContext,
        TransportationSuggestion,
    },
    provider::MockProvider,
    session::PlanSession,
    share,
    validation::{create_default_validator, RawTripInput},
};
use std::sync::Arc;
use tracing::info;

const DEMO_ADDRESS: &str = "http://127.0.0.1:8080/";

fn activity(time: &str, description: &str, cost: f64, booking_needed: bool) -> Activity {
    Activity {
        time: time.to_string(),
        description: description.to_string(),
        estimated_cost: cost,
        booking_needed,
    }
}

/// Canned plan served by the offline provider
fn sample_plan() -> ItineraryPlan {
    ItineraryPlan {
        trip_title: "Lakes and Palaces in Udaipur".to_string(),
        total_estimated_cost: 3900.0,
        accommodation: vec![
            AccommodationSuggestion {
                name: "Jagat Niwas Palace".to_string(),
                description: "Haveli hotel on the banks of Lake Pichola.".to_string(),
                estimated_cost_per_night: 3500.0,
            },
            AccommodationSuggestion {
                name: "Moustache Udaipur".to_string(),
                description: "Budget hostel a short walk from Gangaur Ghat.".to_string(),
                estimated_cost_per_night: 700.0,
            },
        ],
        transportation: TransportationSuggestion {
            recommendation: "Walk the old city; take an auto-rickshaw to Sajjangarh.".to_string(),
        },
        daily_plans: vec![
            ItineraryDay {
                day: 1,
                title: "The City Palace and Lake Pichola".to_string(),
                activities: vec![
                    activity("9:00 AM", "City Palace complex", 400.0, true),
                    activity("1:00 PM", "Thali lunch near Jagdish Temple", 350.0, false),
                    activity("5:00 PM", "Sunset boat ride on Lake Pichola", 800.0, true),
                ],
                daily_cost: 1550.0,
            },
            ItineraryDay {
                day: 2,
                title: "Gardens, Crafts and the Monsoon Palace".to_string(),
                activities: vec![
                    activity("10:00 AM", "Saheliyon ki Bari gardens", 50.0, false),
                    activity("1:00 PM", "Miniature painting workshop", 1500.0, true),
                    activity("5:30 PM", "Sajjangarh Monsoon Palace at dusk", 800.0, false),
                ],
                daily_cost: 2350.0,
            },
        ],
    }
}

fn print_plan(plan: &ItineraryPlan) {
    println!("\n=== {} ===", plan.trip_title);
    println!("Estimated activity cost: ₹{}", plan.total_estimated_cost);
    for day in &plan.daily_plans {
        println!("\nDay {}: {} (₹{})", day.day, day.title, day.daily_cost);
        for a in &day.activities {
            let flag = if a.booking_needed { " [book ahead]" } else { "" };
            println!("  {:>9}  {} - ₹{}{}", a.time, a.description, a.estimated_cost, flag);
        }
    }
    println!("\nStay:");
    for stay in &plan.accommodation {
        println!(
            "  {} (₹{}/night): {}",
            stay.name, stay.estimated_cost_per_night, stay.description
        );
    }
    println!("Getting around: {}", plan.transportation.recommendation);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Itinerary Planner demo starting (offline provider)");

    let translations = Translations::english();
    let user = auth::login("Asha", "asha@example.in", "demo-password")?;
    let context = SessionContext::new(Some(user), Language::En);

    let provider = Arc::new(MockProvider::succeeding(sample_plan()));
    let validator = Arc::new(create_default_validator());

    let session = PlanSession::open(
        context.clone(),
        translations.clone(),
        DEMO_ADDRESS,
        provider.clone(),
        validator.clone(),
    );

    let input = RawTripInput {
        destination: "Udaipur".to_string(),
        duration: "2".to_string(),
        budget: "5000".to_string(),
        interests: vec!["heritage".to_string(), "art".to_string()],
        language: Language::En,
    };

    if let Some(message) = translations.loading_message(std::time::Duration::ZERO) {
        println!("{}", message);
    }
    session.submit(&input).await?;

    let snapshot = session.snapshot().await;
    let Some(plan) = snapshot.state.plan().cloned() else {
        eprintln!("Generation ended in state {}", snapshot.state.name());
        return Ok(());
    };
    print_plan(&plan);

    let link = share::share_url(DEMO_ADDRESS, &plan)?;
    println!("\nShare link: {}", link);

    // Opening the link restores the plan without another provider call
    let shared = PlanSession::open(
        context,
        translations.clone(),
        &link,
        provider.clone(),
        validator,
    );
    info!(
        state = shared.snapshot().await.state.name(),
        provider_calls = provider.calls(),
        "Reopened from share link"
    );

    session.start_booking().await;
    session.confirm_booking().await;

    if let Some(receipt) = session.snapshot().await.receipt {
        let user = session.context().await.user;
        let text = booking::confirmation_text(&translations, &plan, user.as_ref());
        println!("\n=== {} ===", text.title);
        println!("{}", text.subtitle);
        println!("{}", text.message);
        println!("Reference: {} | Amount: ₹{}", receipt.reference, receipt.amount);
    }

    Ok(())
}
