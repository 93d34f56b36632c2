use std::collections::BTreeMap;
use std::fmt::Debug;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{ConfigMap, Node, Pod, Secret, Service};
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

const FIELD_MANAGER: &str = "falcon-eye";

/// Typed wrapper over the pod-scheduler API. Every operation is idempotent:
/// not-found on delete is success, conflict on create triggers exactly one
/// replace attempt. No operation retries internally — callers own retry
/// policy (see the Lifecycle Controller's "next read is the retry" rule).
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    namespace: String,
}

impl ClusterClient {
    pub async fn try_default(namespace: impl Into<String>) -> Result<Self, Error> {
        let client = Client::try_default().await?;
        Ok(ClusterClient { client, namespace: namespace.into() })
    }

    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        ClusterClient { client, namespace: namespace.into() }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn apply<K>(&self, name: &str, object: K) -> Result<K, Error>
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        match api.create(&PostParams::default(), &object).await {
            Ok(created) => Ok(created),
            Err(err) => {
                let tagged = Error::from_kube(err);
                match tagged {
                    Error::Conflict(_) => api
                        .replace(name, &PostParams::default(), &object)
                        .await
                        .map_err(Error::from_kube),
                    other => Err(other),
                }
            }
        }
    }

    pub async fn apply_deployment(&self, name: &str, deployment: Deployment) -> Result<Deployment, Error> {
        self.apply(name, deployment).await
    }

    pub async fn apply_service(&self, name: &str, service: Service) -> Result<Service, Error> {
        self.apply(name, service).await
    }

    pub async fn delete_by_name<K>(&self, name: &str) -> Result<(), Error>
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(err) => {
                let tagged = Error::from_kube(err);
                if tagged.is_not_found() {
                    Ok(())
                } else {
                    Err(tagged)
                }
            }
        }
    }

    pub async fn delete_by_labels<K>(&self, selector: &str) -> Result<(), Error>
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        let lp = ListParams::default().labels(selector);
        let items = api.list(&lp).await.map_err(Error::from_kube)?;
        for item in items {
            if let Some(name) = item.meta().name.clone() {
                self.delete_by_name::<K>(&name).await?;
            }
        }
        Ok(())
    }

    pub async fn list_workloads_by_label<K>(&self, selector: &str) -> Result<Vec<K>, Error>
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        let lp = ListParams::default().labels(selector);
        let items = api.list(&lp).await.map_err(Error::from_kube)?;
        Ok(items.items)
    }

    /// Maps the first container state of the single pod matching `selector`
    /// into a coarse summary, per the Status Reconciler's mapping rules.
    pub async fn get_pod_status_for_selector(&self, selector: &str) -> Result<Option<PodSummary>, Error> {
        let api: Api<Pod> = self.api();
        let lp = ListParams::default().labels(selector);
        let pods = api.list(&lp).await.map_err(Error::from_kube)?;
        let Some(pod) = pods.items.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(PodSummary::from_pod(&pod)))
    }

    pub async fn read_nodes(&self) -> Result<Vec<Node>, Error> {
        let api: Api<Node> = Api::all(self.client.clone());
        let nodes = api.list(&ListParams::default()).await.map_err(Error::from_kube)?;
        Ok(nodes.items)
    }

    pub async fn read_config_map(&self, name: &str) -> Result<ConfigMap, Error> {
        let api: Api<ConfigMap> = self.api();
        api.get(name).await.map_err(Error::from_kube)
    }

    pub async fn patch_config_map(&self, name: &str, data: BTreeMap<String, String>) -> Result<ConfigMap, Error> {
        let api: Api<ConfigMap> = self.api();
        let patch = serde_json::json!({ "data": data });
        api.patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map_err(Error::from_kube)
    }

    pub async fn create_or_replace_secret(&self, name: &str, secret: Secret) -> Result<Secret, Error> {
        self.apply(name, secret).await
    }

    pub async fn create_job(&self, job: Job) -> Result<Job, Error> {
        let api: Api<Job> = self.api();
        api.create(&PostParams::default(), &job).await.map_err(Error::from_kube)
    }

    /// Creates the CronJob if absent, otherwise patches schedule + template
    /// in place (the template holds the Job spec the runner pod executes).
    pub async fn ensure_cron_job(&self, name: &str, cron_job: CronJob) -> Result<CronJob, Error> {
        let api: Api<CronJob> = self.api();
        match api.get(name).await {
            Ok(_) => {
                let patch = Patch::Merge(&cron_job);
                api.patch(name, &PatchParams::apply(FIELD_MANAGER), &patch)
                    .await
                    .map_err(Error::from_kube)
            }
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                api.create(&PostParams::default(), &cron_job).await.map_err(Error::from_kube)
            }
            Err(err) => Err(Error::from_kube(err)),
        }
    }

    pub async fn delete_cron_job(&self, name: &str) -> Result<(), Error> {
        self.delete_by_name::<CronJob>(name).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodSummary {
    Running,
    Waiting { reason: Option<String> },
    Terminated { reason: Option<String> },
    Pending,
}

impl PodSummary {
    fn from_pod(pod: &Pod) -> PodSummary {
        let state = pod
            .status
            .as_ref()
            .and_then(|s| s.container_statuses.as_ref())
            .and_then(|cs| cs.first())
            .and_then(|cs| cs.state.as_ref());

        match state {
            Some(s) if s.running.is_some() => PodSummary::Running,
            Some(s) if s.waiting.is_some() => {
                let waiting = s.waiting.as_ref().unwrap();
                PodSummary::Waiting { reason: waiting.reason.clone() }
            }
            Some(s) if s.terminated.is_some() => {
                let terminated = s.terminated.as_ref().unwrap();
                PodSummary::Terminated { reason: terminated.reason.clone() }
            }
            _ => PodSummary::Pending,
        }
    }

    /// True when the container state signals a crash or image pull error,
    /// the Status Reconciler's "waiting with a crash/image reason" rule.
    pub fn is_failing(&self) -> bool {
        match self {
            PodSummary::Terminated { .. } => true,
            PodSummary::Waiting { reason: Some(r) } => {
                matches!(
                    r.as_str(),
                    "CrashLoopBackOff" | "ImagePullBackOff" | "ErrImagePull" | "CreateContainerConfigError"
                )
            }
            _ => false,
        }
    }
}
