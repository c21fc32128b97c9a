//! One function per backend operation.
//!
//! No validation, retry or caching happens here; backend errors propagate
//! unchanged. The `*_auth` operations write the session when the backend
//! returns an `access_token`.

use crate::error::Result;
use crate::gateway::GatewayClient;
use crate::session::{Profile, SessionStore};
use crate::types::*;

/// Typed access to every station backend route
#[derive(Debug, Clone)]
pub struct RouteService {
    gateway: GatewayClient,
}

impl RouteService {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    // ==================== Citizen ====================

    pub async fn add_citizen(&self, creds: &CitizenCredentials) -> Result<CitizenRegistered> {
        Ok(self.gateway.post("/citizen/addcitizen", creds).await?)
    }

    /// Sign in as a citizen; stores `{citizen_id, aadhar_no}` on success.
    pub async fn citizen_auth(&self, creds: &CitizenCredentials) -> Result<CitizenAuthResponse> {
        let response: CitizenAuthResponse =
            self.gateway.post("/citizen/citizenAuth", creds).await?;

        if let Some(ref token) = response.access_token {
            let aadhar_no = response
                .aadhar_no
                .clone()
                .unwrap_or_else(|| creds.aadhar_no.clone());
            self.session().save(
                token,
                Profile::Citizen {
                    citizen_id: response.citizen_id,
                    aadhar_no,
                },
            )?;
        }
        Ok(response)
    }

    /// File an escalation. Only `{fir_id, reason}` is sent; the backend takes
    /// the citizen identity from the bearer token.
    pub async fn escalate_fir(&self, request: &EscalationRequest) -> Result<EscalationReceipt> {
        Ok(self.gateway.post("/citizen/escalatefir", request).await?)
    }

    // ==================== Police ====================

    pub async fn add_police_member(&self, member: &NewPoliceMember) -> Result<PoliceMemberCreated> {
        Ok(self.gateway.post("/policeauth/addpolicemember", member).await?)
    }

    /// Sign in as an officer; stores `{police_member_id, station_id, name}`.
    pub async fn police_auth(&self, creds: &PoliceCredentials) -> Result<PoliceAuthResponse> {
        let response: PoliceAuthResponse =
            self.gateway.post("/policeauth/policeauth", creds).await?;

        if let Some(ref token) = response.access_token {
            self.session().save(
                token,
                Profile::Police {
                    police_member_id: response.police_member_id.unwrap_or(creds.member_id),
                    station_id: response.station_id.unwrap_or(creds.station_id),
                    name: response.name.clone().unwrap_or_default(),
                },
            )?;
        }
        Ok(response)
    }

    pub async fn all_members(&self) -> Result<Vec<PoliceMember>> {
        Ok(self.gateway.get("/policeauth/allmembers").await?)
    }

    // ==================== FIR ====================

    pub async fn register_incident(&self, fir: &FirCreate) -> Result<FirRegistered> {
        Ok(self.gateway.post("/fir/register_incident", fir).await?)
    }

    pub async fn add_progress(&self, update: &ProgressUpdate) -> Result<ProgressList> {
        Ok(self.gateway.post("/fir/add_progress", update).await?)
    }

    pub async fn get_progress(&self, fir_id: &str) -> Result<ProgressList> {
        let body = FirRef {
            fir_id: fir_id.to_string(),
        };
        Ok(self.gateway.post("/fir/get_progress", &body).await?)
    }

    /// Full record with progress (newest first) and culprits.
    pub async fn fir_details(&self, fir_id: &str) -> Result<FirDetail> {
        Ok(self
            .gateway
            .get_with_query("/fir/details", &[("fir_id", fir_id)])
            .await?)
    }

    pub async fn close_fir(&self, fir_id: &str) -> Result<MessageResponse> {
        let body = FirRef {
            fir_id: fir_id.to_string(),
        };
        Ok(self.gateway.post("/fir/close_fir", &body).await?)
    }

    /// FIRs of the signed-in officer's station.
    pub async fn list_by_station(&self) -> Result<StationFirs> {
        Ok(self.gateway.get("/fir/list_by_station").await?)
    }

    pub async fn list_all(&self) -> Result<Vec<FirSummary>> {
        Ok(self.gateway.get("/fir/list").await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<FirSummary>> {
        Ok(self.gateway.get_with_query("/fir/search", &[("q", query)]).await?)
    }

    pub async fn list_by_aadhar(&self, aadhar_no: &str) -> Result<Vec<FirSummary>> {
        Ok(self
            .gateway
            .get_with_query("/fir/list_by_aadhar", &[("aadhar_no", aadhar_no)])
            .await?)
    }

    pub async fn fir_detail(&self, fir_id: &str) -> Result<FirDetail> {
        let path = format!("/fir/detail/{}", urlencoding::encode(fir_id));
        Ok(self.gateway.get(&path).await?)
    }

    // ==================== Government ====================

    /// Create a government account. Some deployments sign the new account in
    /// directly; the session is stored only when a token comes back.
    pub async fn add_government(&self, creds: &GovernmentCredentials) -> Result<GovernmentCreated> {
        let response: GovernmentCreated =
            self.gateway.post("/government/addgovernment", creds).await?;

        if let Some(ref token) = response.access_token {
            self.session().save(
                token,
                Profile::Government {
                    government_member_id: response
                        .government_id
                        .or(Some(creds.government_member_id)),
                },
            )?;
        }
        Ok(response)
    }

    pub async fn government_auth(
        &self,
        creds: &GovernmentCredentials,
    ) -> Result<GovernmentAuthResponse> {
        let response: GovernmentAuthResponse =
            self.gateway.post("/government/governmentAuth", creds).await?;

        if let Some(ref token) = response.access_token {
            self.session().save(
                token,
                Profile::Government {
                    government_member_id: Some(creds.government_member_id),
                },
            )?;
        }
        Ok(response)
    }

    pub async fn government_search_fir(&self, region: &str) -> Result<RegionSearchResult> {
        let body = RegionQuery {
            region: region.to_string(),
        };
        Ok(self
            .gateway
            .post("/government/governmentsearchfir", &body)
            .await?)
    }

    pub async fn escalations(&self, filter: EscalationFilter) -> Result<Vec<Escalation>> {
        Ok(self
            .gateway
            .get_with_query("/government/escalations", &[("status", filter.as_str())])
            .await?)
    }

    pub async fn update_escalation_status(
        &self,
        escalation_id: i64,
        status: EscalationStatus,
    ) -> Result<Escalation> {
        let path = format!("/government/escalations/{}/status", escalation_id);
        Ok(self
            .gateway
            .patch_with_query(&path, &[("new_status", status.as_str())])
            .await?)
    }
}
