//! Raw CVDW record shapes.
//!
//! Field names follow the wire format via `rename`; every optional field is
//! decoded leniently (see [`super::decode`]).

use chrono::NaiveDate;
use serde::Deserialize;

use super::decode;

/// Value of `status` stored for every row derived from a confirmed sale.
pub const SOLD_STATUS: &str = "Vendido";

/// A development (`empreendimentos`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DevelopmentRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "nome", default, deserialize_with = "decode::opt_string")]
    pub name: Option<String>,
    #[serde(rename = "endereco", default, deserialize_with = "decode::opt_string")]
    pub address: Option<String>,
    #[serde(rename = "cidade", default, deserialize_with = "decode::opt_string")]
    pub city: Option<String>,
    #[serde(rename = "estado", default, deserialize_with = "decode::opt_string")]
    pub state: Option<String>,
    #[serde(rename = "cep", default, deserialize_with = "decode::opt_string")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_f64")]
    pub vgv: Option<f64>,
    #[serde(rename = "data_lancamento", default, deserialize_with = "decode::opt_date")]
    pub launch_date: Option<NaiveDate>,
}

/// A sellable unit (`unidades`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "empreendimento_id", default, deserialize_with = "decode::opt_i64")]
    pub development_id: Option<i64>,
    #[serde(rename = "numero", default, deserialize_with = "decode::opt_string")]
    pub number: Option<String>,
    #[serde(rename = "bloco", default, deserialize_with = "decode::opt_string")]
    pub block: Option<String>,
    #[serde(rename = "andar", default, deserialize_with = "decode::opt_i32")]
    pub floor: Option<i32>,
    #[serde(rename = "tipologia_id", default, deserialize_with = "decode::opt_i64")]
    pub typology_id: Option<i64>,
    #[serde(rename = "area_privativa", default, deserialize_with = "decode::opt_f64")]
    pub private_area: Option<f64>,
    #[serde(rename = "area_total", default, deserialize_with = "decode::opt_f64")]
    pub total_area: Option<f64>,
    #[serde(rename = "valor_tabela", default, deserialize_with = "decode::opt_f64")]
    pub list_price: Option<f64>,
    #[serde(rename = "valor_venda", default, deserialize_with = "decode::opt_f64")]
    pub sale_price: Option<f64>,
    #[serde(default, deserialize_with = "decode::opt_string")]
    pub status: Option<String>,
}

/// A unit typology (`tipologia_unidades`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypologyRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "nome", default, deserialize_with = "decode::opt_string")]
    pub name: Option<String>,
    #[serde(rename = "dormitorios", default, deserialize_with = "decode::opt_i32")]
    pub bedrooms: Option<i32>,
    #[serde(default, deserialize_with = "decode::opt_i32")]
    pub suites: Option<i32>,
    #[serde(rename = "banheiros", default, deserialize_with = "decode::opt_i32")]
    pub bathrooms: Option<i32>,
    #[serde(rename = "vagas_garagem", default, deserialize_with = "decode::opt_i32")]
    pub parking_spaces: Option<i32>,
    #[serde(rename = "area_minima", default, deserialize_with = "decode::opt_f64")]
    pub min_area: Option<f64>,
    #[serde(rename = "area_maxima", default, deserialize_with = "decode::opt_f64")]
    pub max_area: Option<f64>,
}

/// A reservation as returned by `reservas`.
///
/// The same payload feeds both the `reservations` table and, when confirmed,
/// the `sales` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReservationRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "reserva_id", default, deserialize_with = "decode::opt_i64")]
    pub reservation_id: Option<i64>,
    #[serde(rename = "empreendimento", default, deserialize_with = "decode::opt_string")]
    pub development_name: Option<String>,
    #[serde(rename = "empreendimento_id", default, deserialize_with = "decode::opt_i64")]
    pub development_id: Option<i64>,
    #[serde(rename = "unidade_id", default, deserialize_with = "decode::opt_i64")]
    pub unit_id: Option<i64>,
    #[serde(rename = "corretor", default, deserialize_with = "decode::opt_string")]
    pub broker: Option<String>,
    #[serde(rename = "corretor_id", default, deserialize_with = "decode::opt_i64")]
    pub broker_id: Option<i64>,
    #[serde(rename = "corretor_nome", default, deserialize_with = "decode::opt_string")]
    pub broker_name: Option<String>,
    #[serde(rename = "time_corretor", default, deserialize_with = "decode::opt_string")]
    pub broker_team: Option<String>,
    #[serde(rename = "cliente", default, deserialize_with = "decode::opt_string")]
    pub customer: Option<String>,
    #[serde(rename = "cliente_nome", default, deserialize_with = "decode::opt_string")]
    pub customer_name: Option<String>,
    #[serde(rename = "valor", default, deserialize_with = "decode::opt_f64")]
    pub amount: Option<f64>,
    /// Raw sale date; presence decides whether the reservation is a sale.
    #[serde(rename = "data_venda", default, deserialize_with = "decode::opt_string")]
    pub sale_date_raw: Option<String>,
    #[serde(rename = "ativo", default, deserialize_with = "decode::opt_string")]
    pub active_flag: Option<String>,
    #[serde(rename = "data_reserva", default, deserialize_with = "decode::opt_date")]
    pub reserved_on: Option<NaiveDate>,
    #[serde(rename = "data_vencimento", default, deserialize_with = "decode::opt_date")]
    pub expires_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "decode::opt_string")]
    pub status: Option<String>,
}

impl ReservationRecord {
    /// Active (`ativo == "S"`) with a non-blank sale date.
    #[must_use]
    pub fn is_confirmed_sale(&self) -> bool {
        self.active_flag.as_deref() == Some("S")
            && self
                .sale_date_raw
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty())
    }

    /// Parsed sale date, if the raw value is in a known format.
    #[must_use]
    pub fn sale_date(&self) -> Option<NaiveDate> {
        self.sale_date_raw
            .as_deref()
            .and_then(|raw| decode::value_to_date(&serde_json::Value::String(raw.to_string())))
    }
}

/// A commission line (`comissoes`). Carries no row of its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommissionRecord {
    #[serde(rename = "reserva_id", default, deserialize_with = "decode::opt_i64")]
    pub reservation_id: Option<i64>,
    #[serde(rename = "venda_id", default, deserialize_with = "decode::opt_i64")]
    pub sale_id: Option<i64>,
    #[serde(rename = "valor_comissao", default, deserialize_with = "decode::opt_f64")]
    pub amount: Option<f64>,
    #[serde(rename = "percentual_comissao", default, deserialize_with = "decode::opt_f64")]
    pub percent: Option<f64>,
}

/// Financing terms of a reservation (`reservas/condicoes`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaleConditionRecord {
    #[serde(rename = "reserva_id", default, deserialize_with = "decode::opt_i64")]
    pub reservation_id: Option<i64>,
    #[serde(rename = "valor_financiamento", default, deserialize_with = "decode::opt_f64")]
    pub financing_amount: Option<f64>,
    #[serde(rename = "valor_entrada", default, deserialize_with = "decode::opt_f64")]
    pub down_payment: Option<f64>,
    #[serde(rename = "numero_parcelas", default, deserialize_with = "decode::opt_i32")]
    pub installments: Option<i32>,
}

/// A commission payout to a broker (`repasses`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayoutRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "venda_id", default, deserialize_with = "decode::opt_i64")]
    pub sale_id: Option<i64>,
    #[serde(rename = "corretor_id", default, deserialize_with = "decode::opt_i64")]
    pub broker_id: Option<i64>,
    #[serde(rename = "corretor_nome", default, deserialize_with = "decode::opt_string")]
    pub broker_name: Option<String>,
    #[serde(rename = "valor_repasse", default, deserialize_with = "decode::opt_f64")]
    pub amount: Option<f64>,
    #[serde(rename = "percentual_repasse", default, deserialize_with = "decode::opt_f64")]
    pub percent: Option<f64>,
    #[serde(rename = "data_repasse", default, deserialize_with = "decode::opt_date")]
    pub payout_date: Option<NaiveDate>,
    #[serde(rename = "data_pagamento", default, deserialize_with = "decode::opt_date")]
    pub paid_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "decode::opt_string")]
    pub status: Option<String>,
    #[serde(rename = "observacoes", default, deserialize_with = "decode::opt_string")]
    pub notes: Option<String>,
}

/// A prosoluto calculation (`prosoluto`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProsolutoRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "venda_id", default, deserialize_with = "decode::opt_i64")]
    pub sale_id: Option<i64>,
    #[serde(rename = "empreendimento_id", default, deserialize_with = "decode::opt_i64")]
    pub development_id: Option<i64>,
    #[serde(rename = "corretor_id", default, deserialize_with = "decode::opt_i64")]
    pub broker_id: Option<i64>,
    #[serde(rename = "valor_prosoluto", default, deserialize_with = "decode::opt_f64")]
    pub amount: Option<f64>,
    #[serde(rename = "percentual_prosoluto", default, deserialize_with = "decode::opt_f64")]
    pub percent: Option<f64>,
    #[serde(rename = "data_calculo", default, deserialize_with = "decode::opt_date")]
    pub calculated_on: Option<NaiveDate>,
    #[serde(rename = "data_pagamento", default, deserialize_with = "decode::opt_date")]
    pub paid_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "decode::opt_string")]
    pub status: Option<String>,
}

/// A broker attendance (`atendimentos`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttendanceRecord {
    #[serde(deserialize_with = "decode::id")]
    pub id: i64,
    #[serde(rename = "corretor_id", default, deserialize_with = "decode::opt_i64")]
    pub broker_id: Option<i64>,
    #[serde(rename = "corretor_nome", default, deserialize_with = "decode::opt_string")]
    pub broker_name: Option<String>,
    #[serde(rename = "grupo_corretor", default, deserialize_with = "decode::opt_string")]
    pub broker_group: Option<String>,
    #[serde(rename = "time_corretor", default, deserialize_with = "decode::opt_string")]
    pub broker_team: Option<String>,
    #[serde(rename = "cliente_nome", default, deserialize_with = "decode::opt_string")]
    pub customer_name: Option<String>,
    #[serde(rename = "cliente_email", default, deserialize_with = "decode::opt_string")]
    pub customer_email: Option<String>,
    #[serde(rename = "cliente_telefone", default, deserialize_with = "decode::opt_string")]
    pub customer_phone: Option<String>,
    #[serde(rename = "empreendimento_id", default, deserialize_with = "decode::opt_i64")]
    pub development_id: Option<i64>,
    #[serde(rename = "data_atendimento", default, deserialize_with = "decode::opt_date")]
    pub attended_on: Option<NaiveDate>,
    #[serde(rename = "tipo_atendimento", default, deserialize_with = "decode::opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_string")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reservation(value: serde_json::Value) -> ReservationRecord {
        serde_json::from_value(value).expect("reservation should decode")
    }

    #[test]
    fn confirmation_requires_active_flag_and_sale_date() {
        let confirmed = |value| reservation(value).is_confirmed_sale();

        assert!(confirmed(json!({"id": 1, "ativo": "S", "data_venda": "2024-05-02"})));
        assert!(!confirmed(json!({"id": 2, "ativo": "N", "data_venda": "2024-05-02"})));
        assert!(!confirmed(json!({"id": 3, "ativo": "S", "data_venda": ""})));
        assert!(!confirmed(json!({"id": 4, "ativo": "S", "data_venda": "   "})));
        assert!(!confirmed(json!({"id": 5, "ativo": "S"})));
        assert!(!confirmed(json!({"id": 6, "ativo": "S", "data_venda": null})));
    }

    #[test]
    fn confirmed_sale_with_unknown_date_format_keeps_no_date() {
        let r = reservation(json!({"id": 7, "ativo": "S", "data_venda": "maio/2024"}));
        assert!(r.is_confirmed_sale());
        assert_eq!(r.sale_date(), None);
    }

    #[test]
    fn reservation_decodes_string_numbers() {
        let r = reservation(json!({
            "id": "991",
            "reserva_id": "55",
            "empreendimento": "Residencial Aurora",
            "unidade_id": 12,
            "valor": "450000,00",
            "data_venda": "10/01/2025",
            "ativo": "S"
        }));
        assert_eq!(r.id, 991);
        assert_eq!(r.reservation_id, Some(55));
        assert_eq!(r.amount, Some(450_000.0));
        assert_eq!(r.sale_date(), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(r.development_name.as_deref(), Some("Residencial Aurora"));
    }

    #[test]
    fn record_without_id_fails_to_decode() {
        let err = serde_json::from_value::<DevelopmentRecord>(json!({"nome": "Sem id"}));
        assert!(err.is_err());
        let err = serde_json::from_value::<DevelopmentRecord>(json!({"id": "", "nome": "Vazio"}));
        assert!(err.is_err());
    }

    #[test]
    fn commission_tolerates_missing_keys() {
        let c: CommissionRecord =
            serde_json::from_value(json!({"valor_comissao": 1200.5})).expect("decode");
        assert_eq!(c.amount, Some(1200.5));
        assert_eq!(c.reservation_id, None);
        assert_eq!(c.sale_id, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let d: DevelopmentRecord = serde_json::from_value(json!({
            "id": 3,
            "nome": "Torre Sul",
            "campo_novo": {"x": 1}
        }))
        .expect("decode");
        assert_eq!(d.name.as_deref(), Some("Torre Sul"));
        assert_eq!(d.vgv, None);
    }
}
