use crate::common::errors::AppError;
use crate::common::json::JsonUtil;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    #[default]
    #[serde(alias = "Texto")]
    Text,
    #[serde(alias = "Texto largo")]
    LongText,
    #[serde(alias = "Número", alias = "Numero")]
    Number,
    #[serde(alias = "Correo")]
    Email,
    #[serde(alias = "Teléfono", alias = "Telefono")]
    Phone,
    #[serde(alias = "Fecha")]
    Date,
    #[serde(alias = "Hora")]
    Time,
    #[serde(alias = "Fecha y hora")]
    Datetime,
    #[serde(alias = "Selección única", alias = "Selector", alias = "Radio")]
    SingleSelect,
    #[serde(alias = "Selección múltiple")]
    MultiSelect,
    #[serde(alias = "Casilla", alias = "Checkbox")]
    Checkbox,
    #[serde(alias = "Archivo")]
    File,
    #[serde(alias = "URL")]
    Url,
}

impl FieldType {
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "Texto",
            FieldType::LongText => "Texto largo",
            FieldType::Number => "Número",
            FieldType::Email => "Correo",
            FieldType::Phone => "Teléfono",
            FieldType::Date => "Fecha",
            FieldType::Time => "Hora",
            FieldType::Datetime => "Fecha y hora",
            FieldType::SingleSelect => "Selección única",
            FieldType::MultiSelect => "Selección múltiple",
            FieldType::Checkbox => "Casilla",
            FieldType::File => "Archivo",
            FieldType::Url => "URL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdditionalField {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "tipo", alias = "type")]
    pub field_type: FieldType,
    #[serde(alias = "requerido")]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TwoTierGroup {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "contenido")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(alias = "itemNombre")]
    pub name: String,
    #[serde(alias = "camposAdicionales")]
    pub additional_fields: Vec<AdditionalField>,
    pub sla: String,
    #[serde(alias = "grupo")]
    pub group: TwoTierGroup,
    #[serde(alias = "tipoInformacion")]
    pub info_type: String,
    #[serde(alias = "buzon")]
    pub mailbox: String,
    // Empty means "inherit from the subcategory".
    #[serde(alias = "aprobadores")]
    pub approvers: String,
    #[serde(alias = "formularioZoho")]
    pub form_link: String,
    #[serde(alias = "gruposAsistencia")]
    pub assist_groups: TwoTierGroup,
    #[serde(alias = "gruposUsuario")]
    pub user_groups: TwoTierGroup,
    #[serde(alias = "observaciones")]
    pub notes: String,
}

impl Item {
    pub fn row_count(&self) -> u32 {
        (self.additional_fields.len() as u32).max(2)
    }

    pub fn effective_approvers<'a>(&'a self, owner: &'a Subcategory) -> &'a str {
        if self.approvers.trim().is_empty() {
            &owner.approvers
        } else {
            &self.approvers
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subcategory {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    // One approver per line.
    #[serde(alias = "aprobadores")]
    pub approvers: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "subcategorias")]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralData {
    #[serde(alias = "nombreServicio")]
    pub service_name: String,
    #[serde(alias = "objetivoServicio")]
    pub service_objective: String,
    #[serde(alias = "plantilla")]
    pub template: String,
    #[serde(alias = "ambito")]
    pub scope: String,
    #[serde(alias = "sitio")]
    pub site: String,
    #[serde(alias = "contacto")]
    pub contact: String,
    #[serde(alias = "usuariosBeneficiados")]
    pub beneficiaries: String,
    #[serde(alias = "alcance")]
    pub service_reach: String,
    #[serde(alias = "tiempoRetencion")]
    pub retention_time: String,
    #[serde(alias = "requiereReportes")]
    pub requires_reports: String,
    #[serde(alias = "observaciones")]
    pub observations: String,
    #[serde(alias = "autorizadoPor")]
    pub authorized_by: String,
    #[serde(alias = "revisado")]
    pub reviewed_by: String,
}

impl GeneralData {
    pub fn value_of(&self, key: &str) -> Option<&str> {
        let value = match key {
            "serviceName" => &self.service_name,
            "serviceObjective" => &self.service_objective,
            "template" => &self.template,
            "scope" => &self.scope,
            "site" => &self.site,
            "contact" => &self.contact,
            "beneficiaries" => &self.beneficiaries,
            "serviceReach" => &self.service_reach,
            "retentionTime" => &self.retention_time,
            "requiresReports" => &self.requires_reports,
            "observations" => &self.observations,
            "authorizedBy" => &self.authorized_by,
            "reviewedBy" => &self.reviewed_by,
            _ => return None,
        };
        Some(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Flowchart {
    pub file_name: String,
    pub mime_type: String,
    // Base64 payload, optionally with a `data:` URL prefix.
    #[serde(alias = "base64")]
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceDocument {
    pub id: String,
    pub general: GeneralData,
    #[serde(alias = "detalle")]
    pub categories: Vec<Category>,
    pub flowchart: Option<Flowchart>,
}

impl ServiceDocument {
    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        JsonUtil::from_str(text)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, AppError> {
        JsonUtil::from_value(value)
    }

    pub fn item_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.subcategories)
            .map(|s| s.items.len())
            .sum()
    }
}
