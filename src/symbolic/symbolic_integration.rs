use crate::symbolic::symbolic_engine::Expr;
use log::debug;

/// Integration variable of the substitution rule. Not an identifier, so it can never
/// collide with a user symbol.
const SUBSTITUTION_SYMBOL: &str = "_u'";

impl Expr {
    /// SYMBOLIC INTEGRATION

    /// Main integration method - integrates with respect to a variable
    /// Returns the indefinite integral (without constant of integration)
    /// or an error naming the subexpression no rule applies to.
    pub fn integrate(&self, var: &str) -> Result<Expr, String> {
        // ∫ c dx = c*x
        if !self.contains_variable(var) {
            return Ok(self.clone() * Expr::var(var));
        }
        let direct = match self {
            // ∫ x dx = x²/2
            Expr::Var(_) => Ok(Expr::var(var).pow(Expr::num(2)) / Expr::num(2)),

            // ∫ (f + g) dx = ∫ f dx + ∫ g dx
            Expr::Add(terms) => {
                let mut integrals = Vec::with_capacity(terms.len());
                for term in terms {
                    integrals.push(term.integrate(var)?);
                }
                Ok(Expr::sum(integrals))
            }

            // Handle multiplication cases
            Expr::Mul(factors) => self.integrate_multiplication(factors, var),

            // ∫ x^n dx = x^(n+1)/(n+1) for n ≠ -1
            Expr::Pow(base, exp) => self.integrate_power(base, exp, var),

            // ∫ e^(ax+b) dx = e^(ax+b)/a
            Expr::Exp(arg) => {
                let (a, _) = arg.linear_or_err(var)?;
                Ok(self.clone() / a)
            }

            // ∫ ln(ax+b) dx = (ax+b)*ln(ax+b)/a - x
            Expr::Ln(arg) => {
                let (a, _) = arg.linear_or_err(var)?;
                Ok(*arg.clone() * self.clone() / a - Expr::var(var))
            }

            // ∫ sin(ax+b) dx = -cos(ax+b)/a
            Expr::sin(arg) => {
                let (a, _) = arg.linear_or_err(var)?;
                Ok(-Expr::new_cos(*arg.clone()) / a)
            }

            // ∫ cos(ax+b) dx = sin(ax+b)/a
            Expr::cos(arg) => {
                let (a, _) = arg.linear_or_err(var)?;
                Ok(Expr::new_sin(*arg.clone()) / a)
            }

            // ∫ tg(ax+b) dx = -ln(cos(ax+b))/a
            Expr::tg(arg) => {
                let (a, _) = arg.linear_or_err(var)?;
                Ok(-Expr::new_ln(Expr::new_cos(*arg.clone())) / a)
            }

            // ∫ f^(n)(x) dx = f^(n-1)(x)
            Expr::Derivative(inner, v, order) if v == var => {
                if *order == 1 {
                    Ok(*inner.clone())
                } else {
                    Ok(Expr::Derivative(inner.clone(), v.clone(), order - 1))
                }
            }

            _ => Err(format!("no integration rule for {}", self)),
        };
        match direct {
            Ok(result) => Ok(result),
            Err(reason) => self.integrate_by_substitution(var).map_err(|_| reason),
        }
    }

    /// Integrates what can be integrated and leaves the rest as `Integral(..)`,
    /// term by term, with constant factors pulled out of the unevaluated parts.
    pub fn integrate_or_unevaluated(&self, var: &str) -> Expr {
        if let Expr::Add(terms) = self {
            return Expr::sum(
                terms
                    .iter()
                    .map(|t| t.integrate_or_unevaluated(var))
                    .collect(),
            );
        }
        match self.integrate(var) {
            Ok(result) => result,
            Err(reason) => {
                debug!("integral of {} left unevaluated: {}", self, reason);
                let (constant, dependent): (Vec<Expr>, Vec<Expr>) = self
                    .factors()
                    .into_iter()
                    .partition(|f| !f.contains_variable(var));
                Expr::product(constant)
                    * Expr::Integral(Expr::product(dependent).boxed(), var.to_string())
            }
        }
    }

    /// Splits `a*x + b` into (a, b) with a != 0 and both free of `var`.
    pub fn as_linear(&self, var: &str) -> Option<(Expr, Expr)> {
        let a = self.diff(var);
        if a.is_zero() || a.contains_variable(var) {
            return None;
        }
        let b = (self.clone() - a.clone() * Expr::var(var)).expand();
        if b.contains_variable(var) {
            return None;
        }
        Some((a, b))
    }

    fn linear_or_err(&self, var: &str) -> Result<(Expr, Expr), String> {
        self.as_linear(var)
            .ok_or_else(|| format!("argument {} is not linear in {}", self, var))
    }

    /// Enhanced multiplication integration that tries different strategies
    fn integrate_multiplication(&self, factors: &[Expr], var: &str) -> Result<Expr, String> {
        // Check if one factor is constant: ∫ c*f dx = c*∫ f dx
        let (constant, dependent): (Vec<Expr>, Vec<Expr>) =
            factors.iter().cloned().partition(|f| !f.contains_variable(var));
        if !constant.is_empty() {
            let rest = Expr::product(dependent);
            return Ok(Expr::product(constant) * rest.integrate(var)?);
        }

        // Pattern 1: polynomial * exp/sin/cos of a linear argument
        if let Some(result) = self.integrate_polynomial_times_periodic(&dependent, var)? {
            return Ok(result);
        }

        // Pattern 2: polynomial * logarithm
        if let Some(result) = self.integrate_polynomial_times_logarithm(&dependent, var)? {
            return Ok(result);
        }

        // Fall back to expansion of products of sums
        let expanded = self.expand();
        if expanded != *self {
            return expanded.integrate(var);
        }
        Err(format!("no integration rule for the product {}", self))
    }

    /// Splits factors into a monomial of `var` with positive integer power and the rest.
    fn split_monomial(factors: &[Expr], var: &str) -> (Vec<Expr>, Vec<Expr>) {
        factors.iter().cloned().partition(|f| match f {
            Expr::Var(name) => name == var,
            Expr::Pow(base, exp) => {
                matches!(base.as_ref(), Expr::Var(name) if name == var)
                    && exp
                        .as_integer()
                        .is_some_and(|n| n > num::BigInt::from(0))
            }
            _ => false,
        })
    }

    /// ∫ p(x)*g(x) dx = p*G1 - p'*G2 + p''*G3 - ... (tabular integration by parts)
    /// where g is exp, sin or cos of a linear argument and Gk its k-th antiderivative.
    fn integrate_polynomial_times_periodic(
        &self,
        factors: &[Expr],
        var: &str,
    ) -> Result<Option<Expr>, String> {
        let (monomial, others) = Self::split_monomial(factors, var);
        if monomial.is_empty() || others.len() != 1 {
            return Ok(None);
        }
        let g = &others[0];
        let periodic = match g {
            Expr::Exp(arg) | Expr::sin(arg) | Expr::cos(arg) => arg.as_linear(var).is_some(),
            _ => false,
        };
        if !periodic {
            return Ok(None);
        }
        let mut p = Expr::product(monomial);
        let mut g_int = g.integrate(var)?;
        let mut sign = Expr::one();
        let mut terms = Vec::new();
        loop {
            terms.push(Expr::product(vec![sign.clone(), p.clone(), g_int.clone()]));
            p = p.diff(var);
            if p.is_zero() {
                break;
            }
            g_int = g_int.integrate(var)?;
            sign = -sign;
        }
        Ok(Some(Expr::sum(terms)))
    }

    /// ∫ p(x)*ln(u) dx = P*ln(u) - ∫ P*u'/u dx with P = ∫ p dx
    fn integrate_polynomial_times_logarithm(
        &self,
        factors: &[Expr],
        var: &str,
    ) -> Result<Option<Expr>, String> {
        let (monomial, others) = Self::split_monomial(factors, var);
        if monomial.is_empty() || others.len() != 1 {
            return Ok(None);
        }
        let Expr::Ln(u) = &others[0] else {
            return Ok(None);
        };
        if u.as_linear(var).is_none() {
            return Ok(None);
        }
        let big_p = Expr::product(monomial).integrate(var)?;
        let remainder = (big_p.clone() * u.diff(var) / *u.clone()).expand();
        let remainder_int = remainder.integrate(var)?;
        Ok(Some(big_p * others[0].clone() - remainder_int))
    }

    /// Handle power integration
    fn integrate_power(&self, base: &Expr, exp: &Expr, var: &str) -> Result<Expr, String> {
        // Case 1: ∫ (ax+b)^n dx where n is constant
        if !exp.contains_variable(var) {
            if let Some((a, _)) = base.as_linear(var) {
                if *exp == Expr::minus_one() {
                    // ∫ 1/(ax+b) dx = ln(ax+b)/a
                    return Ok(Expr::new_ln(base.clone()) / a);
                }
                let raised = exp.clone() + Expr::one();
                return Ok(Expr::power(base.clone(), raised.clone()) / (a * raised));
            }
            // polynomial base with positive integer power: expand first
            if matches!(base, Expr::Add(_))
                && exp.as_integer().is_some_and(|n| n > num::BigInt::from(0))
            {
                let expanded = self.expand();
                if expanded != *self {
                    return expanded.integrate(var);
                }
            }
            return Err(format!("no integration rule for the power {}", self));
        }
        // Case 2: ∫ c^(ax+b) dx = c^(ax+b) / (a*ln(c)) where c is constant
        if !base.contains_variable(var) {
            let (a, _) = exp.linear_or_err(var)?;
            return Ok(self.clone() / (a * Expr::new_ln(base.clone())));
        }
        Err(format!("no integration rule for the power {}", self))
    }

    /// ∫ h(u(x))*u'(x) dx = H(u(x)) where H is an antiderivative of h.
    ///
    /// Candidates for u are function applications among the factors and their arguments.
    fn integrate_by_substitution(&self, var: &str) -> Result<Expr, String> {
        let placeholder = Expr::var(SUBSTITUTION_SYMBOL);
        for candidate in self.substitution_candidates(var) {
            let du = candidate.diff(var);
            if du.is_zero() {
                continue;
            }
            let ratio = (self.clone() / du).simplify();
            let in_u = ratio.replace(&candidate, &placeholder);
            if in_u.contains_variable(var) {
                continue;
            }
            if let Ok(antiderivative) = in_u.integrate(SUBSTITUTION_SYMBOL) {
                if antiderivative.has(&|e| matches!(e, Expr::Integral(..))) {
                    continue;
                }
                return Ok(antiderivative.substitute(SUBSTITUTION_SYMBOL, &candidate));
            }
        }
        Err(format!("no substitution found for {}", self))
    }

    fn substitution_candidates(&self, var: &str) -> Vec<Expr> {
        let mut candidates = Vec::new();
        for factor in self.factors() {
            match &factor {
                Expr::Exp(arg) | Expr::Ln(arg) | Expr::sin(arg) | Expr::cos(arg) | Expr::tg(arg) => {
                    candidates.push(factor.clone());
                    candidates.push(*arg.clone());
                }
                Expr::Pow(base, exp) => {
                    candidates.push(*base.clone());
                    candidates.push(*exp.clone());
                    if let Expr::sin(arg) | Expr::cos(arg) | Expr::Ln(arg) = base.as_ref() {
                        candidates.push(*arg.clone());
                    }
                }
                _ => {}
            }
        }
        candidates.retain(|c| {
            c.contains_variable(var) && !matches!(c, Expr::Var(name) if name == var)
        });
        candidates.dedup();
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn test_integrate_constant() {
        let result = Expr::num(5).integrate("x").unwrap();
        assert_eq!(result, Expr::num(5) * x());
        let result = Expr::var("y").integrate("x").unwrap();
        assert_eq!(result.to_string(), "x*y");
    }

    #[test]
    fn test_integrate_power() {
        let result = x().pow(Expr::num(2)).integrate("x").unwrap();
        assert_eq!(result.to_string(), "x**3/3");
        let result = (Expr::one() / x()).integrate("x").unwrap();
        assert_eq!(result.to_string(), "log(x)");
    }

    #[test]
    fn test_integrate_polynomial() {
        let f = Expr::num(3) * x().pow(Expr::num(2)) + Expr::num(2);
        let result = f.integrate("x").unwrap();
        assert_eq!(result.to_string(), "x**3 + 2*x");
    }

    #[test]
    fn test_integrate_trig() {
        let result = Expr::new_sin(x()).integrate("x").unwrap();
        assert_eq!(result.to_string(), "-cos(x)");
        let result = Expr::new_cos(Expr::num(2) * x()).integrate("x").unwrap();
        assert_eq!(result.to_string(), "sin(2*x)/2");
    }

    #[test]
    fn test_integrate_exponential() {
        let result = Expr::new_exp(Expr::num(-5) * x()).integrate("x").unwrap();
        assert_eq!(result.to_string(), "-exp(-5*x)/5");
    }

    #[test]
    fn test_integrate_logarithm() {
        let result = Expr::new_ln(x()).integrate("x").unwrap();
        assert_eq!(result.to_string(), "x*log(x) - x");
    }

    #[test]
    fn test_integration_by_parts() {
        let result = (x() * Expr::new_exp(x())).integrate("x").unwrap();
        assert_eq!(result.to_string(), "x*exp(x) - exp(x)");
        // the derivative of the result gives back the integrand
        let back = result.diff("x").simplify();
        assert_eq!(back, x() * Expr::new_exp(x()));
    }

    #[test]
    fn test_polynomial_times_log() {
        let result = (x() * Expr::new_ln(x())).integrate("x").unwrap();
        let back = result.diff("x").simplify();
        assert_eq!(back, x() * Expr::new_ln(x()));
    }

    #[test]
    fn test_substitution() {
        let f = x() * Expr::new_exp(x().pow(Expr::num(2)));
        let result = f.integrate("x").unwrap();
        assert_eq!(result.to_string(), "exp(x**2)/2");
        let g = Expr::new_sin(x()) * Expr::new_cos(x());
        let result = g.integrate("x").unwrap();
        assert_eq!(result.to_string(), "sin(x)**2/2");
    }

    #[test]
    fn test_unevaluated_integral() {
        let f = Expr::new_func("f", vec![x()]);
        assert!(f.integrate("x").is_err());
        let result = (Expr::num(3) * f.clone()).integrate_or_unevaluated("x");
        assert_eq!(result.to_string(), "3*Integral(f(x), x)");
        let mixed = f + x();
        assert_eq!(
            mixed.integrate_or_unevaluated("x").to_string(),
            "x**2/2 + Integral(f(x), x)"
        );
    }

    #[test]
    fn test_as_linear() {
        let expr = Expr::num(3) * x() + Expr::num(2);
        let (a, b) = expr.as_linear("x").unwrap();
        assert_eq!(a, Expr::num(3));
        assert_eq!(b, Expr::num(2));
        assert!(x().pow(Expr::num(2)).as_linear("x").is_none());
    }
}
