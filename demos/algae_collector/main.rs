use std::error::Error;

use algae_rl::{
    algo::tabular::{QTableAgent, QTableAgentConfig},
    gym::{AlgaeField, AlgaeFieldConfig},
    train::{self, DemoConfig, TrainConfig},
    viz::{Visualizer, VizConfig},
};

const NUM_EPISODES: usize = 1000;

fn main() -> Result<(), Box<dyn Error>> {
    let mut env = AlgaeField::new(AlgaeFieldConfig::default())?;
    let mut agent = QTableAgent::for_env(&env, QTableAgentConfig::default());
    let train_config = TrainConfig {
        episodes: NUM_EPISODES,
        ..Default::default()
    };
    let demo_config = DemoConfig::default();

    let mut viz = Visualizer::init(NUM_EPISODES, VizConfig::default())?;
    log::info!("Q-table: {} states x {} actions", agent.num_states(), agent.num_actions());

    let history = train::train(&mut env, &mut agent, &train_config, &mut viz)?;

    let mut reports = Vec::new();
    if viz.prompt("Training complete! Press Enter to watch the trained agent")? {
        reports = train::demo(&mut env, &agent, &demo_config, &mut viz)?;
        viz.prompt("Demo complete! Press Enter to exit")?;
    }
    viz.restore()?;

    println!(
        "Trained for {} episodes, final epsilon {:.4}",
        history.len(),
        agent.epsilon()
    );
    println!(
        "Average score over the last 50 episodes: {:.2} (best {})",
        history.recent_mean_score(50),
        history.best_score()
    );
    for (i, report) in reports.iter().enumerate() {
        println!(
            "Demo episode {}: {} algae in {} steps",
            i + 1,
            report.score,
            report.steps
        );
    }

    Ok(())
}
