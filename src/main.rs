mod clock;
mod config;
mod quiz;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clock::{ClockRegistry, SessionClock};
use config::Config;
use dotenv::dotenv;
use log::{debug, error, info, warn};
use quiz::{
    analytics::{PremiseCategory, SessionStats},
    catalog::Catalog,
    generator::QuizGenerator,
    GeneratedQuiz,
};
use rand::{rngs::StdRng, SeedableRng};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, MessageId},
};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    Ready,
    AwaitingAnswer {
        quiz: GeneratedQuiz,
        stats: SessionStats,
    },
    Answered {
        stats: SessionStats,
    },
}

/// Shared by every chat: the quiz source and the per-chat question clocks.
struct Trainer {
    generator: QuizGenerator,
    rng: Mutex<StdRng>,
    clocks: ClockRegistry<ChatId>,
    clock_tick: Duration,
}

impl Trainer {
    fn new(catalog: Catalog, config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            generator: QuizGenerator::new(Arc::new(catalog)),
            rng: Mutex::new(rng),
            clocks: ClockRegistry::default(),
            clock_tick: config.clock_tick,
        }
    }

    fn next_quiz(&self) -> GeneratedQuiz {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.generator.generate(&mut *rng)
    }

    /// Starts the on-screen timer for a new question, stopping any previous one first.
    fn start_clock(&self, bot: Bot, chat_id: ChatId, message_id: MessageId) {
        let tick = self.clock_tick;
        self.clocks.restart(chat_id, || {
            SessionClock::start(tick, move |elapsed| {
                let bot = bot.clone();
                async move {
                    if let Err(err) = bot
                        .edit_message_text(chat_id, message_id, clock_text(elapsed))
                        .await
                    {
                        debug!("Failed to update the clock in chat {}: {}", chat_id, err);
                    }
                }
            })
        });
    }

    fn stop_clock(&self, chat_id: ChatId) -> Option<Duration> {
        self.clocks.stop(&chat_id)
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    pretty_env_logger::init();
    info!("Starting syllogism trainer bot...");

    let trainer = match build_trainer() {
        Ok(trainer) => Arc::new(trainer),
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Ready].endpoint(receive_start))
            .branch(dptree::case![State::AwaitingAnswer { quiz, stats }].endpoint(receive_answer))
            .branch(dptree::case![State::Answered { stats }].endpoint(receive_next_step)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), trainer])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

fn build_trainer() -> Result<Trainer, Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let catalog = match &config.catalog_path {
        Some(path) => {
            info!("Loading the quiz catalog from {}", path.display());
            Catalog::from_path(path)?
        }
        None => Catalog::bundled()?,
    };
    info!(
        "Catalog loaded: {} premises, {} questions",
        catalog.premises().len(),
        catalog.question_count()
    );
    if config.seed.is_some() {
        info!("Using a fixed quiz seed");
    }
    Ok(Trainer::new(catalog, &config))
}

const START_BUTTON: &str = "Start";
const RESTART_BUTTON: &str = "Restart";
const YES_BUTTON: &str = "Yes";
const NO_BUTTON: &str = "No";
const NEXT_BUTTON: &str = "Next Question";
const END_BUTTON: &str = "End Session";

const GREETING_TEXT: &str = "Hi! I am the Syllogism Trainer. I will show you a premise and ask whether a conclusion follows from it. Answer Yes or No as quickly as you can, and I will time every answer.";

fn single_button(text: &str) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(text)]])
}

fn answer_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(YES_BUTTON),
        KeyboardButton::new(NO_BUTTON),
    ]])
}

fn next_step_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(NEXT_BUTTON),
        KeyboardButton::new(END_BUTTON),
    ]])
}

fn clock_text(elapsed: Duration) -> String {
    format!("Time: {}s", elapsed.as_secs())
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(single_button(START_BUTTON))
        .await?;
    dialogue.update(State::Ready).await?;
    Ok(())
}

async fn receive_start(
    trainer: Arc<Trainer>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(START_BUTTON) | Some(RESTART_BUTTON) => {
            info!("Chat {} started a session", msg.chat.id);
            ask_question(&trainer, &bot, &dialogue, msg.chat.id, SessionStats::default()).await
        }
        _ => {
            bot.send_message(msg.chat.id, "Press Start when you are ready.")
                .reply_markup(single_button(START_BUTTON))
                .await?;
            Ok(())
        }
    }
}

async fn ask_question(
    trainer: &Trainer,
    bot: &Bot,
    dialogue: &QuizDialogue,
    chat_id: ChatId,
    stats: SessionStats,
) -> HandlerResult {
    let quiz = trainer.next_quiz();
    debug!("Chat {}: asking {:?}", chat_id, quiz);

    let question_text = format!(
        "Points: {}\n\n{}\n\n{}",
        stats.points(),
        quiz.premise,
        quiz.question
    );
    bot.send_message(chat_id, question_text)
        .reply_markup(answer_keyboard())
        .await?;

    let clock_message = bot.send_message(chat_id, clock_text(Duration::ZERO)).await?;
    trainer.start_clock(bot.clone(), chat_id, clock_message.id);

    dialogue.update(State::AwaitingAnswer { quiz, stats }).await?;
    Ok(())
}

async fn receive_answer(
    trainer: Arc<Trainer>,
    bot: Bot,
    dialogue: QuizDialogue,
    (quiz, stats): (GeneratedQuiz, SessionStats),
    msg: Message,
) -> HandlerResult {
    let answer = match msg.text() {
        Some(YES_BUTTON) => true,
        Some(NO_BUTTON) => false,
        _ => {
            bot.send_message(msg.chat.id, "Please answer Yes or No.")
                .reply_markup(answer_keyboard())
                .await?;
            return Ok(());
        }
    };

    let elapsed = trainer.stop_clock(msg.chat.id).unwrap_or_else(|| {
        warn!("No clock was running in chat {}", msg.chat.id);
        Duration::ZERO
    });
    let was_correct = quiz.is_correct_answer(answer);
    let category = PremiseCategory::classify(&quiz.premise);
    debug!(
        "Chat {}: answered {} in {:.1}s ({}), correct: {}",
        msg.chat.id,
        answer,
        elapsed.as_secs_f64(),
        category,
        was_correct
    );

    let mut stats = stats;
    stats.record(category, elapsed, was_correct);

    let mut feedback = if was_correct { "Correct!" } else { "Incorrect." }.to_string();
    if let Some(explanation) = &quiz.explanation {
        feedback.push_str(&format!("\n\nExplanation: {}", explanation));
    }
    if let Some(key_takeaway) = &quiz.key_takeaway {
        feedback.push_str(&format!("\n\nKey takeaway: {}", key_takeaway));
    }
    bot.send_message(msg.chat.id, feedback)
        .reply_markup(next_step_keyboard())
        .await?;

    dialogue.update(State::Answered { stats }).await?;
    Ok(())
}

async fn receive_next_step(
    trainer: Arc<Trainer>,
    bot: Bot,
    dialogue: QuizDialogue,
    stats: SessionStats,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(NEXT_BUTTON) => ask_question(&trainer, &bot, &dialogue, msg.chat.id, stats).await,
        Some(END_BUTTON) => {
            trainer.stop_clock(msg.chat.id);
            info!(
                "Chat {} ended a session after {} questions",
                msg.chat.id,
                stats.answered()
            );
            bot.send_message(msg.chat.id, stats.report().to_string())
                .reply_markup(single_button(RESTART_BUTTON))
                .await?;
            dialogue.update(State::Ready).await?;
            Ok(())
        }
        _ => {
            bot.send_message(msg.chat.id, "Choose Next Question or End Session.")
                .reply_markup(next_step_keyboard())
                .await?;
            Ok(())
        }
    }
}
