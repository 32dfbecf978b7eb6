mod config;
mod quiz;

use std::{net::SocketAddr, sync::Arc};

use config::Config;
use dotenv::dotenv;
use quiz::{
    ai_helper::QuizGenerator,
    poll::{DeliveryPlan, PollLimits, QuizPoll},
};
use teloxide::{
    prelude::*,
    types::{ChatAction, ChatId, PollType},
    update_listeners::webhooks,
    utils::command::BotCommands,
    RequestError,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const START_TEXT: &str = "Send me a topic to generate MCQs in poll format.";
const NO_QUESTIONS_TEXT: &str = "No questions were generated. Please try a different topic.";
const ERROR_TEXT: &str = "An error occurred while processing your request. Please try again later.";
const NOT_TEXT: &str = "Please send the topic as a text message.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum Command {
    #[command(description = "start generating quizzes.")]
    Start,
    #[command(description = "show this text.")]
    Help,
}

#[tokio::main]
async fn main() {
    // The variables may come from the real environment instead of a .env file
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Starting MCQ poll bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(config).await {
        log::error!("Bot stopped with an error: {}", err);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> HandlerResult {
    let generator = QuizGenerator::new(
        &config.chatgpt_api_key,
        config.model,
        config.request_timeout,
    )?;
    log::info!("Using model {}", generator.model());
    let generator = Arc::new(generator);
    let limits = PollLimits::default();

    let bot = Bot::new(config.telegram_token);

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command),
        )
        .branch(dptree::endpoint(receive_topic));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![generator, limits])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            let address = SocketAddr::from(([0, 0, 0, 0], webhook.port));
            let options = webhooks::Options::new(address, webhook.url.parse()?);
            let listener = webhooks::axum(bot, options).await?;

            log::info!("Receiving updates through {} on {}", webhook.url, address);
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            log::info!("Receiving updates by long polling");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

async fn command(bot: Bot, msg: Message, cmd: Command) -> HandlerResult {
    let text = match cmd {
        Command::Start => START_TEXT.to_string(),
        Command::Help => format!("{}\n\n{}", START_TEXT, Command::descriptions()),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn receive_topic(
    bot: Bot,
    msg: Message,
    generator: Arc<QuizGenerator>,
    limits: PollLimits,
) -> HandlerResult {
    let topic = match msg.text() {
        Some(topic) => topic,
        None => {
            bot.send_message(msg.chat.id, NOT_TEXT).await?;
            return Ok(());
        }
    };

    // The typing indicator is cosmetic, a failure here should not stop the quiz
    let _ = bot
        .send_chat_action(msg.chat.id, ChatAction::Typing)
        .await;

    let quiz = match generator.generate_quiz(topic).await {
        Ok(quiz) => quiz,
        Err(err) => {
            log::error!("Failed to generate questions on {:?}: {}", topic, err);
            bot.send_message(msg.chat.id, ERROR_TEXT).await?;
            return Ok(());
        }
    };

    if quiz.is_empty() {
        log::info!("No questions parsed for {:?}", quiz.topic);
        bot.send_message(msg.chat.id, NO_QUESTIONS_TEXT).await?;
        return Ok(());
    }

    log::info!(
        "Parsed {} questions for {:?}, {} without an answer",
        quiz.len(),
        quiz.topic,
        quiz.answerless().count()
    );

    let plan = DeliveryPlan::new(quiz.questions, &limits);
    if plan.polls.is_empty() {
        log::info!(
            "All {} questions for {:?} were skipped",
            plan.total(),
            quiz.topic
        );
        bot.send_message(msg.chat.id, NO_QUESTIONS_TEXT).await?;
        return Ok(());
    }

    for poll in &plan.polls {
        if let Err(err) = send_quiz_poll(&bot, msg.chat.id, poll).await {
            log::error!("Failed to send poll {:?}: {}", poll.question, err);
            bot.send_message(msg.chat.id, ERROR_TEXT).await?;
            return Ok(());
        }
        log::info!("Poll sent for question: {:?}", poll.question);
    }

    if let Some(summary) = plan.summary() {
        bot.send_message(msg.chat.id, summary).await?;
    }

    Ok(())
}

async fn send_quiz_poll(bot: &Bot, chat_id: ChatId, poll: &QuizPoll) -> Result<Message, RequestError> {
    bot.send_poll(chat_id, poll.question.clone(), poll.options.clone())
        .type_(PollType::Quiz)
        .correct_option_id(poll.correct_option_id)
        .is_anonymous(true)
        .await
}
