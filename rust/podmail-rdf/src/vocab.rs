//! Vocabulary terms used when crawling Solid pods.

/// RDF core vocabulary
pub mod rdf {
    /// `rdf:type`
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDF Schema vocabulary
pub mod rdfs {
    /// `rdfs:seeAlso`
    pub const SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
}

/// Solid terms vocabulary
pub mod solid {
    /// `solid:publicTypeIndex`
    pub const PUBLIC_TYPE_INDEX: &str = "http://www.w3.org/ns/solid/terms#publicTypeIndex";
    /// `solid:TypeRegistration`
    pub const TYPE_REGISTRATION: &str = "http://www.w3.org/ns/solid/terms#TypeRegistration";
    /// `solid:forClass`
    pub const FOR_CLASS: &str = "http://www.w3.org/ns/solid/terms#forClass";
    /// `solid:instance`
    pub const INSTANCE: &str = "http://www.w3.org/ns/solid/terms#instance";
    /// `solid:InsertDeletePatch`
    pub const INSERT_DELETE_PATCH: &str = "http://www.w3.org/ns/solid/terms#InsertDeletePatch";
    /// `solid:inserts`
    pub const INSERTS: &str = "http://www.w3.org/ns/solid/terms#inserts";
}

/// Workspace vocabulary
pub mod space {
    /// `space:preferencesFile`
    pub const PREFERENCES_FILE: &str = "http://www.w3.org/ns/pim/space#preferencesFile";
}

/// vCard vocabulary
pub mod vcard {
    /// `vcard:hasMember`
    pub const HAS_MEMBER: &str = "http://www.w3.org/2006/vcard/ns#hasMember";
}
