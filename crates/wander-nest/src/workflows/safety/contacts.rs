use serde::Serialize;

/// Emergency numbers shown to tourists and guides for a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub city: &'static str,
    pub country: &'static str,
    pub police: &'static str,
    pub ambulance: &'static str,
    pub fire: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tourist_police: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embassy: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_helpline: Option<&'static str>,
}

const fn contact(
    city: &'static str,
    country: &'static str,
    police: &'static str,
    ambulance: &'static str,
    fire: &'static str,
) -> EmergencyContact {
    EmergencyContact {
        city,
        country,
        police,
        ambulance,
        fire,
        tourist_police: None,
        embassy: None,
        local_helpline: None,
    }
}

static EMERGENCY_CONTACTS: [EmergencyContact; 10] = [
    EmergencyContact {
        tourist_police: Some("+91-11-2334-1111"),
        local_helpline: Some("1363 (Tourist Helpline)"),
        ..contact("New Delhi", "India", "100", "102", "101")
    },
    EmergencyContact {
        tourist_police: Some("+91-22-2262-0111"),
        local_helpline: Some("1363 (Tourist Helpline)"),
        ..contact("Mumbai", "India", "100", "102", "101")
    },
    EmergencyContact {
        tourist_police: Some("+91-80-2294-2555"),
        local_helpline: Some("1363 (Tourist Helpline)"),
        ..contact("Bangalore", "India", "100", "102", "101")
    },
    EmergencyContact {
        tourist_police: Some("+44-20-7230-1212 (Met Police)"),
        ..contact(
            "London",
            "United Kingdom",
            "999 or 112",
            "999 or 112",
            "999 or 112",
        )
    },
    EmergencyContact {
        tourist_police: Some("+33-1-53-71-53-71"),
        ..contact("Paris", "France", "17 or 112", "15 or 112", "18 or 112")
    },
    EmergencyContact {
        local_helpline: Some("311 (Non-emergency)"),
        ..contact("New York", "USA", "911", "911", "911")
    },
    EmergencyContact {
        tourist_police: Some("+81-3-3501-0110"),
        local_helpline: Some("+81-50-3816-2787 (Japan Visitor Hotline)"),
        ..contact("Tokyo", "Japan", "110", "119", "119")
    },
    EmergencyContact {
        tourist_police: Some("901"),
        ..contact("Dubai", "UAE", "999", "998", "997")
    },
    EmergencyContact {
        tourist_police: Some("1800-255-0000"),
        ..contact("Singapore", "Singapore", "999", "995", "995")
    },
    EmergencyContact {
        tourist_police: Some("+34-932-562-430"),
        ..contact("Barcelona", "Spain", "112", "112", "112")
    },
];

pub fn emergency_contacts() -> &'static [EmergencyContact] {
    &EMERGENCY_CONTACTS
}

/// Case-insensitive city lookup.
pub fn emergency_contact_for_city(city: &str) -> Option<&'static EmergencyContact> {
    let city = city.trim();
    EMERGENCY_CONTACTS
        .iter()
        .find(|contact| contact.city.eq_ignore_ascii_case(city))
}
