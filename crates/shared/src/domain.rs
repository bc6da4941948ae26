use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Financial indicators accepted by the bankruptcy model.
///
/// The set is closed: the wire name of each variant is the JSON key the
/// upstream model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    DependenciaEmprestimos,
    RendimentoLiquidoPatrimonioAcionistas,
    DividaTotalValorLiquidoTotal,
    RoaBAntesJurosDepreciacaoAposImposto,
    ReceitaDespesaExtraIndustria,
    IndiceDespesasJuros,
    ValorLiquidoAtivos,
    IndiceEndividamento,
    CaixaAtivosTotais,
    CapitalGiroPatrimonioLiquido,
}

impl Indicator {
    pub const ALL: [Indicator; 10] = [
        Indicator::DependenciaEmprestimos,
        Indicator::RendimentoLiquidoPatrimonioAcionistas,
        Indicator::DividaTotalValorLiquidoTotal,
        Indicator::RoaBAntesJurosDepreciacaoAposImposto,
        Indicator::ReceitaDespesaExtraIndustria,
        Indicator::IndiceDespesasJuros,
        Indicator::ValorLiquidoAtivos,
        Indicator::IndiceEndividamento,
        Indicator::CaixaAtivosTotais,
        Indicator::CapitalGiroPatrimonioLiquido,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Indicator::DependenciaEmprestimos => "dependencia_emprestimos",
            Indicator::RendimentoLiquidoPatrimonioAcionistas => {
                "rendimento_liquido_patrimonio_acionistas"
            }
            Indicator::DividaTotalValorLiquidoTotal => "divida_total_valor_liquido_total",
            Indicator::RoaBAntesJurosDepreciacaoAposImposto => {
                "roa_b_antes_juros_depreciacao_apos_imposto"
            }
            Indicator::ReceitaDespesaExtraIndustria => "receita_despesa_extra_industria",
            Indicator::IndiceDespesasJuros => "indice_despesas_juros",
            Indicator::ValorLiquidoAtivos => "valor_liquido_ativos",
            Indicator::IndiceEndividamento => "indice_endividamento",
            Indicator::CaixaAtivosTotais => "caixa_ativos_totais",
            Indicator::CapitalGiroPatrimonioLiquido => "capital_giro_patrimonio_liquido",
        }
    }

    /// Human-facing label: the wire name with underscores shown as spaces.
    pub fn label(self) -> String {
        self.wire_name().replace('_', " ")
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown indicator '{0}'")]
pub struct UnknownIndicator(pub String);

impl FromStr for Indicator {
    type Err = UnknownIndicator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Indicator::ALL
            .into_iter()
            .find(|indicator| indicator.wire_name() == name)
            .ok_or_else(|| UnknownIndicator(name.to_string()))
    }
}
