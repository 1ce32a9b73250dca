//! Heuristic chat scheduler: best-effort extraction of
//! (date, time, mechanic, client, service) from a free-text pt-BR sentence,
//! feeding the same single-slot range-save path the board uses.
//!
//! This is a fixed small grammar — keyword lists, one time regex, substring
//! search for names — not a language model. Each extractor is independent and
//! returns an `Option`; `interpret` composes them and reports exactly which
//! fields are missing, so partial understanding surfaces as an
//! ask-for-more-info reply instead of a wrong booking.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use tracing::debug;

use crate::model::{Appointment, Mechanic, Priority, SlotPayload};
use crate::range;
use crate::store::Store;
use ulid::Ulid;

/// Times the chat refuses to book — the board's lunch display pair. These are
/// display times, deliberately distinct from `grid::LUNCH_SLOTS`.
pub const CHAT_LUNCH_TIMES: [&str; 2] = ["11:00", "12:00"];

const FALLBACK_CLIENT: &str = "Cliente (Via Chat)";
const FALLBACK_SERVICE: &str = "Agendamento via Chat";

/// `14h`, `14h30`, `9:15` — hour then `:` or `h`, minutes optional.
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})[:h](\d{2})?").unwrap());

/// `dd/mm` numeric date.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})").unwrap());

/// The `" para "` split point between service and client.
static PARA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i) para ").unwrap());

const DATE_KEYWORDS: [&str; 3] = ["hoje", "amanhã", "amanha"];
const VERBS: [&str; 2] = ["agendar", "marcar"];

const WEEKDAYS: [(&str, Weekday); 9] = [
    ("domingo", Weekday::Sun),
    ("segunda", Weekday::Mon),
    ("terça", Weekday::Tue),
    ("terca", Weekday::Tue),
    ("quarta", Weekday::Wed),
    ("quinta", Weekday::Thu),
    ("sexta", Weekday::Fri),
    ("sábado", Weekday::Sat),
    ("sabado", Weekday::Sat),
];

/// A fully extracted scheduling request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub date: NaiveDate,
    /// `HH:MM`, zero-padded; not necessarily a grid label.
    pub time: String,
    pub mechanic_id: Ulid,
    pub mechanic_name: String,
    pub client_name: String,
    pub service_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// One or more of date/time/mechanic could not be identified. The field
    /// labels are user-facing.
    Missing(Vec<&'static str>),
    SlotTaken,
    LunchTime,
    /// The persistence boundary failed the write.
    Failed,
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::Missing(fields) => write!(
                f,
                "Entendi que você quer agendar, mas preciso de mais informações. \
                 Não consegui identificar: {}.",
                fields.join(", ")
            ),
            ChatError::SlotTaken => write!(f, "Horário já ocupado."),
            ChatError::LunchTime => write!(f, "Horário de almoço."),
            ChatError::Failed => write!(f, "Não foi possível concluir o agendamento."),
        }
    }
}

impl std::error::Error for ChatError {}

/// Resolve a date mention: `hoje`, `amanhã`, a weekday name (always the next
/// future occurrence — naming today's weekday means next week), or `dd/mm`
/// (current year, rolled forward a year once the date has passed).
/// `text` must already be lowercased.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.contains("hoje") {
        return Some(today);
    }
    if text.contains("amanhã") || text.contains("amanha") {
        return today.checked_add_days(Days::new(1));
    }

    for (name, weekday) in WEEKDAYS {
        if text.contains(name) {
            return Some(next_weekday(today, weekday));
        }
    }

    if let Some(caps) = DATE_RE.captures(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
        if date < today {
            return NaiveDate::from_ymd_opt(today.year() + 1, month, day);
        }
        return Some(date);
    }

    None
}

fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut date = today + Days::new(1);
    while date.weekday() != weekday {
        date = date + Days::new(1);
    }
    date
}

/// First `H[:h]MM?` mention with a plausible hour and minute, as `HH:MM`.
pub fn extract_time(text: &str) -> Option<String> {
    let caps = TIME_RE.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps
        .get(2)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    (hour <= 23 && minute <= 59).then(|| format!("{hour:02}:{minute:02}"))
}

/// Case-insensitive name match, longest full name first so `"marcos petersen"`
/// is not claimed by a mechanic named `"Marcos"`. Within the same pass a
/// first-name token also matches. `text` must already be lowercased.
pub fn find_mechanic<'a>(text: &str, mechanics: &'a [Mechanic]) -> Option<&'a Mechanic> {
    let mut by_length: Vec<&Mechanic> = mechanics.iter().collect();
    by_length.sort_by_key(|m| std::cmp::Reverse(m.name.len()));

    for mechanic in by_length {
        if text.contains(&mechanic.name.to_lowercase()) {
            return Some(mechanic);
        }
        let first = first_name(mechanic).to_lowercase();
        if !first.is_empty() && text.contains(&first) {
            return Some(mechanic);
        }
    }
    None
}

fn first_name(mechanic: &Mechanic) -> &str {
    mechanic.name.split_whitespace().next().unwrap_or("")
}

fn remove_ci(text: &str, token: &str) -> String {
    replace_ci(text, token, "")
}

fn replace_ci(text: &str, token: &str, with: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    match Regex::new(&format!("(?i){}", regex::escape(token))) {
        Ok(re) => re.replace_all(text, with).into_owned(),
        Err(_) => text.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_known_tokens(text: &str, mechanic: &Mechanic) -> String {
    let mut t = remove_ci(text, &mechanic.name);
    t = remove_ci(&t, first_name(mechanic));
    for keyword in DATE_KEYWORDS {
        t = remove_ci(&t, keyword);
    }
    TIME_RE.replace_all(&t, "").into_owned()
}

/// Heuristic client/service split. With a `" para "` pivot the left side is
/// the service and the right side (re-stripped of mechanic/date/time tokens)
/// the client; without one, the whole stripped remainder becomes the client
/// and the service falls back to a placeholder.
pub fn extract_client_service(input: &str, mechanic: &Mechanic) -> (String, String) {
    let mut stripped = strip_known_tokens(input, mechanic);
    for verb in VERBS {
        stripped = remove_ci(&stripped, verb);
    }
    for filler in [" para ", " com ", " as ", " às ", " o ", " a "] {
        stripped = replace_ci(&stripped, filler, " ");
    }
    let combined = collapse_whitespace(&stripped);

    let mut client_name = if combined.is_empty() {
        FALLBACK_CLIENT.to_string()
    } else {
        combined
    };
    let mut service_description = FALLBACK_SERVICE.to_string();

    if let Some(pivot) = PARA_RE.find(input) {
        let mut service = input[..pivot.start()].to_string();
        for verb in VERBS {
            service = remove_ci(&service, verb);
        }
        let service = service.trim();

        let mut client = strip_known_tokens(&input[pivot.end()..], mechanic);
        for filler in [" com ", " às ", " as "] {
            client = replace_ci(&client, filler, " ");
        }
        let client = collapse_whitespace(&client);

        if !client.is_empty() {
            client_name = client;
        }
        if !service.is_empty() {
            service_description = service.to_string();
        }
    }

    (client_name, service_description)
}

/// Run the extractor pipeline over one chat message. Missing core fields
/// (date, time, mechanic) abort with a reply naming exactly what was not
/// understood.
pub fn interpret(
    input: &str,
    mechanics: &[Mechanic],
    today: NaiveDate,
) -> Result<Intent, ChatError> {
    let lowered = input.to_lowercase();

    let date = extract_date(&lowered, today);
    let time = extract_time(&lowered);
    let mechanic = find_mechanic(&lowered, mechanics);

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push("data");
    }
    if time.is_none() {
        missing.push("horário");
    }
    if mechanic.is_none() {
        missing.push("mecânico");
    }
    if !missing.is_empty() {
        return Err(ChatError::Missing(missing));
    }

    let mechanic = mechanic.unwrap();
    let (client_name, service_description) = extract_client_service(input, mechanic);

    Ok(Intent {
        date: date.unwrap(),
        time: time.unwrap(),
        mechanic_id: mechanic.id,
        mechanic_name: mechanic.name.clone(),
        client_name,
        service_description,
    })
}

/// Validate and execute an intent as a single-slot booking at normal priority.
///
/// The slot must be free and not one of the chat lunch display times. A time
/// that passes validation but is not a grid label expands to nothing and
/// succeeds with an empty write — same silent no-op as the range-save path.
pub async fn schedule(store: &Store, intent: &Intent) -> Result<Vec<Appointment>, ChatError> {
    if store
        .get_appointment(intent.date, &intent.time, intent.mechanic_id)
        .is_some()
    {
        return Err(ChatError::SlotTaken);
    }
    if CHAT_LUNCH_TIMES.contains(&intent.time.as_str()) {
        return Err(ChatError::LunchTime);
    }

    let payload = SlotPayload {
        client_name: intent.client_name.clone(),
        service_description: intent.service_description.clone(),
        priority: Priority::Normal,
    };
    let written = store
        .save_appointment_range(
            intent.date,
            &intent.time,
            &intent.time,
            intent.mechanic_id,
            &payload,
            &[],
        )
        .await;

    if written.is_empty() && !range::expand_range(&intent.time, &intent.time).is_empty() {
        return Err(ChatError::Failed);
    }
    debug!(
        "chat booked {} slot(s) at {} {} for {}",
        written.len(),
        intent.date,
        intent.time,
        intent.mechanic_name
    );
    Ok(written)
}
