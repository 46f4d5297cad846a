//! Energy-balance climate model: a century of global mean temperature.
//!
//! Starts from today's ~288 K and relaxes toward radiative equilibrium,
//! sampling 10,000 points over 100 years.
//!
//! Run with:
//!   cargo run --example climate

use dopri45::{linspace, Dopri45, EnergyBalanceModel, IntegrationError, Settings};

fn main() -> Result<(), IntegrationError> {
    let total_time = 100.0; // years
    let dt = 0.01;
    let num_samples = (total_time / dt) as usize;
    let t0 = 288.0; // K

    let model = EnergyBalanceModel::default();
    let times = linspace(0.0, total_time, num_samples);

    let mut solver = Dopri45::new(Settings::default());
    let solution = solver.integrate(&model, 0.0, total_time, &[t0], &times)?;

    let params = &model.params;
    println!("Energy-Balance Climate Model");
    println!("  Absorbed flux:  {:.3} W/m²", params.absorbed_flux());
    println!("  Emitted flux:   {:.3} W/m² at {t0} K", params.emitted_flux(t0));
    println!("  Equilibrium:    {:.2} K", model.equilibrium_temperature());
    println!();

    for &(t, y) in solution.samples.iter().step_by(num_samples / 10) {
        println!("  t = {t:7.2} yr   T = {:.6} K", y[0]);
    }
    println!();
    println!("  Accepted steps: {}", solution.stats.accepted_steps);
    println!("  Rejected steps: {}", solution.stats.rejected_steps);
    println!("  Function evals: {}", solution.stats.fn_evals);
    println!();

    let (_, last) = solution.samples[num_samples - 1];
    println!(
        "Final temperature after {} years: {:.2} K",
        total_time, last[0]
    );
    Ok(())
}
