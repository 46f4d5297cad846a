//! Zero-dimensional energy-balance climate model
//!
//! A single bulk temperature `T` (kelvin) relaxes toward radiative
//! equilibrium:
//!
//! ```text
//! dT/dt = ((1 - albedo) * S / 4 - g * σ * T⁴) / C
//! ```
//!
//! with solar constant `S`, greenhouse factor `g`, Stefan-Boltzmann constant
//! `σ` and heat capacity `C`. Time is in years.

use crate::system::OdeSystem;

/// Physical constants of the energy-balance model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateParams {
    /// Incoming solar radiation at the top of the atmosphere (W/m²)
    pub solar_constant: f64,
    /// Fraction of incoming radiation reflected back to space
    pub albedo: f64,
    /// Stefan-Boltzmann constant (W/m²K⁴)
    pub stefan_boltzmann: f64,
    /// Multiplier on outgoing radiation; larger values trap less heat
    pub greenhouse_factor: f64,
    /// Heat capacity factor dividing the net flux
    pub heat_capacity: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            solar_constant: 1361.0,
            albedo: 0.3,
            stefan_boltzmann: 5.67e-8,
            greenhouse_factor: 1.2,
            heat_capacity: 4.2e9,
        }
    }
}

impl ClimateParams {
    /// Absorbed shortwave flux, averaged over the sphere (W/m²)
    pub fn absorbed_flux(&self) -> f64 {
        (1.0 - self.albedo) * self.solar_constant / 4.0
    }

    /// Emitted longwave flux at `temperature` (W/m²)
    pub fn emitted_flux(&self, temperature: f64) -> f64 {
        self.greenhouse_factor * self.stefan_boltzmann * temperature.powi(4)
    }

    /// Absorbed minus emitted flux
    pub fn net_flux(&self, temperature: f64) -> f64 {
        self.absorbed_flux() - self.emitted_flux(temperature)
    }

    /// Temperature at which absorbed and emitted flux balance
    pub fn equilibrium_temperature(&self) -> f64 {
        (self.absorbed_flux() / (self.greenhouse_factor * self.stefan_boltzmann)).powf(0.25)
    }
}

/// The energy-balance model as an ODE system with state `[T]`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyBalanceModel {
    /// Model constants
    pub params: ClimateParams,
}

impl EnergyBalanceModel {
    /// Model with the given constants
    pub fn new(params: ClimateParams) -> Self {
        Self { params }
    }

    /// Rate of temperature change at `temperature` (K/year)
    pub fn heating_rate(&self, temperature: f64) -> f64 {
        self.params.net_flux(temperature) / self.params.heat_capacity
    }

    /// See [`ClimateParams::equilibrium_temperature`]
    pub fn equilibrium_temperature(&self) -> f64 {
        self.params.equilibrium_temperature()
    }
}

impl OdeSystem<1> for EnergyBalanceModel {
    fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
        dydt[0] = self.heating_rate(y[0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_fluxes() {
        let params = ClimateParams::default();
        assert_relative_eq!(params.absorbed_flux(), 238.175, epsilon = 1e-12);
        // 1.2 * 5.67e-8 * 288^4
        assert_relative_eq!(params.emitted_flux(288.0), 468.1, epsilon = 0.1);
        assert!(params.net_flux(288.0) < 0.0);
    }

    #[test]
    fn test_equilibrium_balances_flux() {
        let params = ClimateParams::default();
        let t_eq = params.equilibrium_temperature();
        assert_relative_eq!(t_eq, 243.2, epsilon = 0.1);
        assert!(params.net_flux(t_eq).abs() < 1e-10);

        let model = EnergyBalanceModel::new(params);
        let mut dydt = [1.0];
        model.rhs(0.0, &[t_eq], &mut dydt);
        assert!(dydt[0].abs() < 1e-18);
    }

    #[test]
    fn test_relaxes_toward_equilibrium() {
        let model = EnergyBalanceModel::default();
        let t_eq = model.equilibrium_temperature();
        assert!(model.heating_rate(t_eq + 10.0) < 0.0);
        assert!(model.heating_rate(t_eq - 10.0) > 0.0);
    }

    #[test]
    fn test_greenhouse_factor_lowers_equilibrium() {
        let weak = ClimateParams {
            greenhouse_factor: 1.0,
            ..ClimateParams::default()
        };
        let strong = ClimateParams {
            greenhouse_factor: 1.5,
            ..ClimateParams::default()
        };
        assert!(strong.equilibrium_temperature() < weak.equilibrium_temperature());
    }

    #[test]
    fn test_default_rate_is_slow() {
        // Heat capacity 4.2e9 makes the drift tiny on a century scale.
        let model = EnergyBalanceModel::default();
        let rate = model.heating_rate(288.0);
        assert!(rate < 0.0 && rate > -1e-7, "rate = {:e}", rate);
    }
}
