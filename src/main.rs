use anyhow::{bail, Context};
use clap::Parser;
use fs_err as fs;

use sustainability_council::auth::AuthSession;
use sustainability_council::chat::ChatController;
use sustainability_council::cli::{self, Command, RunArgs};
use sustainability_council::config::Config;
use sustainability_council::council::Council;
use sustainability_council::domain::{presets, ImageAttachment, ScenarioInput};
use sustainability_council::session::{SessionController, SubmitOutcome, Tool};
use sustainability_council::{log, provider, ux};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    log::init(args.debug);

    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }
    if let Some(secs) = args.timeout_secs {
        cfg.timeout_secs = secs;
    }

    let prov = provider::make_provider(&cfg)?;
    let council = Council::new(prov, cfg.max_prompt_bytes);
    let auth = AuthSession::new();

    match args.command {
        Command::Presets => ux::show_presets(),
        Command::Chat => chat(council).await,
        Command::Run(run) => session(council, auth, run, args.debug).await?,
    }
    Ok(())
}

fn scenario_input(run: &RunArgs) -> anyhow::Result<ScenarioInput> {
    let mut input = match (&run.preset, &run.scenario) {
        (Some(name), _) => match presets::find(name) {
            Some(p) => p.to_input(),
            None => bail!("unknown preset '{name}'; run `council presets` to list them"),
        },
        (None, Some(text)) => ScenarioInput::new(text.clone(), Default::default()),
        (None, None) => {
            let text = ux::read_line("Describe your sustainability scenario: ").unwrap_or_default();
            ScenarioInput::new(text, Default::default())
        }
    };
    if let Some(t) = run.scenario_type {
        input.scenario_type = t;
    }
    if let Some(path) = &run.image {
        let bytes = fs::read(path)?;
        let shown = path.display().to_string();
        let mut image = ImageAttachment::new(bytes, ImageAttachment::mime_for_path(&shown));
        image.file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        input = input.with_image(image);
    }
    Ok(input)
}

async fn session(
    council: Council,
    auth: AuthSession,
    run: RunArgs,
    debug: bool,
) -> anyhow::Result<()> {
    if let Some(name) = &run.user {
        auth.login(name);
    }
    let input = scenario_input(&run).context("could not prepare the scenario")?;
    let controller = SessionController::new(council, auth.clone());
    if let Some(name) = auth.user_name() {
        let image = input.image.as_ref().and_then(|i| i.file_name.as_deref());
        ux::show_session_banner(&name, controller.id(), image);
    }

    if run.coach {
        if let Some(advice) = controller.coach_advice(&input.text).await {
            println!("Scenario Coach: {advice}");
        }
    }

    loop {
        let pb = ux::spinner("The council is debating your scenario...");
        let outcome = controller.submit(input.clone()).await;
        pb.finish_and_clear();

        match outcome {
            SubmitOutcome::Succeeded => break,
            SubmitOutcome::Rejected(msg) => {
                ux::show_error(&msg);
                return Ok(());
            }
            SubmitOutcome::Failed => {
                ux::show_error(&controller.error_message().unwrap_or_default());
                let retryable = controller.error().is_some_and(|e| e.is_retryable());
                if retryable && ux::confirm("Try again?") && controller.retry() {
                    continue;
                }
                return Ok(());
            }
            SubmitOutcome::Ignored | SubmitOutcome::Discarded => return Ok(()),
        }
    }

    let Some(result) = controller.result() else {
        return Ok(());
    };
    ux::show_result(&result);
    if debug {
        log::print_json_debug("council_result", &result)?;
    }

    let tools = [
        (run.improve, Tool::Improve),
        (run.explain, Tool::Explain),
        (run.report, Tool::Report),
    ];
    for (_, tool) in tools.into_iter().filter(|(wanted, _)| *wanted) {
        let pb = ux::spinner("Working on it...");
        let outcome = controller.run_tool(tool).await;
        pb.finish_and_clear();
        if let Err(e) = outcome {
            ux::show_error(&e.user_message());
            continue;
        }
        match tool {
            Tool::Improve => controller.improvement().iter().for_each(ux::show_improvement),
            Tool::Explain => controller.explanation().iter().for_each(ux::show_explanation),
            Tool::Report => controller.report().iter().for_each(|r| ux::show_report(r)),
        }
    }

    if controller.finish() {
        ux::show_finish_overlay();
    }
    Ok(())
}

async fn chat(council: Council) {
    let mut chat = ChatController::new(council);
    for m in chat.messages() {
        ux::show_chat_message(m);
    }
    while let Some(line) = ux::read_line("you> ") {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        let pb = ux::spinner("Thinking...");
        let reply = chat.send(line).await.cloned();
        pb.finish_and_clear();
        if let Some(reply) = reply {
            ux::show_chat_message(&reply);
        }
    }
}
